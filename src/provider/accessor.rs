//! Provider detection.
//!
//! Resolves which wallet provider to use from the configuration:
//! a local key from `MARKETPLACE_PRIVATE_KEY` signing against
//! `wallet.provider_url`, or `wallet.provider_url` on its own. With
//! neither available the answer is a definite `None`.

use std::sync::Arc;
use std::time::Duration;

use crate::config::MarketplaceConfig;
use crate::provider::{HttpProvider, LocalWalletProvider, WalletProvider};
use crate::types::MarketplaceResult;

/// Environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "MARKETPLACE_PRIVATE_KEY";

/// Obtain a provider handle, or `None` when no wallet is available.
///
/// Errors only when a provider is configured but cannot be constructed
/// (malformed URL or key).
pub fn detect_provider(
    config: &MarketplaceConfig,
) -> MarketplaceResult<Option<Arc<dyn WalletProvider>>> {
    let Some(provider_url) = config.wallet.provider_url.as_deref() else {
        if std::env::var_os(PRIVATE_KEY_ENV_VAR).is_some() {
            tracing::warn!(
                "{} is set but wallet.provider_url is not; no provider available",
                PRIVATE_KEY_ENV_VAR
            );
        } else {
            tracing::debug!("No wallet provider configured");
        }
        return Ok(None);
    };

    let timeout = Duration::from_secs(config.wallet.rpc_timeout_secs);
    let http: Arc<dyn WalletProvider> = Arc::new(HttpProvider::new(provider_url, timeout)?);

    if std::env::var_os(PRIVATE_KEY_ENV_VAR).is_some() {
        let local = LocalWalletProvider::from_env(PRIVATE_KEY_ENV_VAR, http)?;
        tracing::info!(provider_url, address = %local.address(), "Using local key wallet provider");
        return Ok(Some(Arc::new(local)));
    }

    tracing::info!(provider_url, "Using JSON-RPC wallet provider");
    Ok(Some(http))
}
