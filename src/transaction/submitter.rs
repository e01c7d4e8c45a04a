//! Hands transactions to the wallet for signing and broadcast.

use std::sync::Arc;

use alloy::primitives::TxHash;
use serde_json::json;

use crate::provider::WalletProvider;
use crate::transaction::types::TransactionParameters;
use crate::types::MarketplaceResult;

/// Forwards transaction requests to the provider.
#[derive(Debug, Clone)]
pub struct TransactionSubmitter {
    provider: Arc<dyn WalletProvider>,
}

impl TransactionSubmitter {
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        Self { provider }
    }

    /// Submit via `eth_sendTransaction` and return the transaction hash.
    pub async fn submit(&self, params: &TransactionParameters) -> MarketplaceResult<TxHash> {
        tracing::debug!(
            from = %params.from,
            to = %params.to,
            nonce = %params.nonce,
            value = ?params.value,
            "Submitting transaction"
        );

        let tx_hash: TxHash = self
            .provider
            .call("eth_sendTransaction", json!([params]))
            .await?;

        tracing::info!(tx_hash = %tx_hash, "Transaction submitted");
        Ok(tx_hash)
    }
}
