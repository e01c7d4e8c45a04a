//! Receipt polling.
//!
//! Queries `eth_getTransactionReceipt` at a fixed interval until the receipt
//! appears. There is no backoff and no retry cap: a query that fails is
//! treated like a missing receipt. `wait_with_timeout` bounds the same loop
//! with a deadline.

use std::sync::Arc;
use std::time::{Duration, Instant};

use alloy::primitives::TxHash;
use alloy::rpc::types::TransactionReceipt;
use serde_json::json;
use tokio::time::{sleep, timeout};

use crate::observability::metrics;
use crate::provider::WalletProvider;
use crate::types::{MarketplaceError, MarketplaceResult};

/// Fixed-interval receipt poller.
#[derive(Debug, Clone)]
pub struct ReceiptPoller {
    provider: Arc<dyn WalletProvider>,
    interval: Duration,
}

impl ReceiptPoller {
    pub fn new(provider: Arc<dyn WalletProvider>, interval: Duration) -> Self {
        Self { provider, interval }
    }

    /// Query the receipt once.
    pub async fn fetch(&self, tx_hash: TxHash) -> MarketplaceResult<Option<TransactionReceipt>> {
        metrics::record_receipt_poll();
        self.provider
            .call("eth_getTransactionReceipt", json!([tx_hash]))
            .await
    }

    /// Poll until a receipt appears.
    pub async fn wait(&self, tx_hash: TxHash) -> TransactionReceipt {
        let started = Instant::now();
        let mut attempts = 0u64;

        loop {
            attempts += 1;
            match self.fetch(tx_hash).await {
                Ok(Some(receipt)) => {
                    metrics::record_confirmation(started.elapsed());
                    tracing::info!(
                        tx_hash = %tx_hash,
                        block_number = ?receipt.block_number,
                        success = receipt.status(),
                        attempts,
                        "Transaction receipt received"
                    );
                    return receipt;
                }
                Ok(None) => {
                    tracing::debug!(tx_hash = %tx_hash, attempts, "Transaction pending");
                }
                Err(e) => {
                    tracing::warn!(tx_hash = %tx_hash, error = %e, "Receipt query failed, retrying");
                }
            }
            sleep(self.interval).await;
        }
    }

    /// Poll until a receipt appears or `timeout_secs` elapse.
    pub async fn wait_with_timeout(
        &self,
        tx_hash: TxHash,
        timeout_secs: u64,
    ) -> MarketplaceResult<TransactionReceipt> {
        timeout(Duration::from_secs(timeout_secs), self.wait(tx_hash))
            .await
            .map_err(|_| MarketplaceError::Timeout(timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::testing::ScriptedProvider;
    use crate::transaction::testing::receipt_json;
    use alloy::primitives::B256;
    use serde_json::Value;

    fn mined(success: bool) -> Value {
        receipt_json(B256::repeat_byte(0x44), 100, success)
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_polls_until_receipt() {
        let scripted = Arc::new(ScriptedProvider::new());
        scripted
            .respond("eth_getTransactionReceipt", Value::Null)
            .respond("eth_getTransactionReceipt", Value::Null)
            .respond("eth_getTransactionReceipt", mined(true));
        let poller = ReceiptPoller::new(scripted.clone(), Duration::from_secs(4));

        let receipt = poller.wait(B256::repeat_byte(0x44)).await;
        assert!(receipt.status());
        assert_eq!(receipt.block_number, Some(100));
        assert_eq!(receipt.transaction_hash, B256::repeat_byte(0x44));
        assert_eq!(scripted.calls_to("eth_getTransactionReceipt").len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_retries_after_errors() {
        let scripted = Arc::new(ScriptedProvider::new());
        scripted
            .fail("eth_getTransactionReceipt", MarketplaceError::Rpc("flaky".into()))
            .respond("eth_getTransactionReceipt", mined(false));
        let poller = ReceiptPoller::new(scripted, Duration::from_secs(4));

        let receipt = poller.wait(B256::repeat_byte(0x44)).await;
        assert!(!receipt.status());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_with_timeout_expires() {
        let scripted = Arc::new(ScriptedProvider::new());
        scripted.respond("eth_getTransactionReceipt", Value::Null);
        let poller = ReceiptPoller::new(scripted, Duration::from_secs(4));

        let err = poller
            .wait_with_timeout(B256::repeat_byte(0x44), 30)
            .await
            .unwrap_err();
        assert!(matches!(err, MarketplaceError::Timeout(30)));
    }
}
