//! JSON-RPC over HTTP provider.
//!
//! # Responsibilities
//! - Forward each EIP-1193 request through alloy's `RpcClient`
//! - Enforce a per-request timeout
//! - Map JSON-RPC error objects to `MarketplaceError::Provider`

use std::time::Duration;

use alloy::rpc::client::{ClientBuilder, RpcClient};
use alloy::transports::TransportError;
use async_trait::async_trait;
use serde_json::Value;
use tokio::time::timeout;

use crate::provider::WalletProvider;
use crate::types::{MarketplaceError, MarketplaceResult};

/// Provider that forwards every request to a JSON-RPC endpoint.
pub struct HttpProvider {
    client: RpcClient,
    url: url::Url,
    timeout: Duration,
}

impl HttpProvider {
    /// Create a provider for `url` with the given request timeout.
    pub fn new(url: &str, timeout: Duration) -> MarketplaceResult<Self> {
        let url: url::Url = url
            .parse()
            .map_err(|e| MarketplaceError::Rpc(format!("Invalid provider URL '{}': {}", url, e)))?;
        let client = ClientBuilder::default().http(url.clone());

        Ok(Self {
            client,
            url,
            timeout,
        })
    }

    /// Endpoint this provider talks to.
    pub fn url(&self) -> &url::Url {
        &self.url
    }
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("url", &self.url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl WalletProvider for HttpProvider {
    async fn request(&self, method: &str, params: Value) -> MarketplaceResult<Value> {
        tracing::trace!(method, "Provider request");

        let call = self.client.request::<_, Value>(method.to_string(), params);
        match timeout(self.timeout, call).await {
            Ok(result) => result.map_err(|e| map_transport_error(method, e)),
            Err(_) => Err(MarketplaceError::Rpc(format!("{} timed out", method))),
        }
    }
}

/// Error objects from the node or wallet keep their code; everything else
/// is a transport failure.
fn map_transport_error(method: &str, error: TransportError) -> MarketplaceError {
    match error.as_error_resp() {
        Some(payload) => MarketplaceError::Provider {
            code: payload.code,
            message: payload.message.to_string(),
        },
        None => MarketplaceError::Rpc(format!("{} request failed: {}", method, error)),
    }
}
