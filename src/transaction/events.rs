//! Event extraction.
//!
//! Once a receipt's block is known, query the contract's historical logs
//! from that block and decode the operation's output event.

use std::sync::Arc;

use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, TxHash};
use alloy::rpc::types::{Filter, Log, TransactionReceipt};
use alloy::sol_types::SolEvent;
use serde_json::json;

use crate::provider::WalletProvider;
use crate::types::{MarketplaceError, MarketplaceResult};

/// Reads and decodes marketplace contract events.
#[derive(Debug, Clone)]
pub struct EventExtractor {
    provider: Arc<dyn WalletProvider>,
    contract: Address,
}

impl EventExtractor {
    pub fn new(provider: Arc<dyn WalletProvider>, contract: Address) -> Self {
        Self { provider, contract }
    }

    /// All `E` logs emitted by the contract since `from_block`.
    pub async fn logs<E: SolEvent>(&self, from_block: u64) -> MarketplaceResult<Vec<Log>> {
        let filter = Filter::new()
            .address(self.contract)
            .event_signature(E::SIGNATURE_HASH)
            .from_block(from_block)
            .to_block(BlockNumberOrTag::Latest);
        let logs: Vec<Log> = self.provider.call("eth_getLogs", json!([filter])).await?;

        tracing::debug!(event = E::SIGNATURE, from_block, count = logs.len(), "Fetched contract events");
        Ok(logs)
    }

    /// Decode the `E` emitted for `receipt`.
    ///
    /// Takes the log produced by the receipt's own transaction. Only when
    /// the node omits transaction hashes on every log does the first `E` in
    /// the block range stand in for it.
    pub async fn for_receipt<E: SolEvent>(&self, receipt: &TransactionReceipt) -> MarketplaceResult<E> {
        let from_block = receipt
            .block_number
            .ok_or_else(|| MarketplaceError::Decode("receipt has no block number".to_string()))?;
        let logs = self.logs::<E>(from_block).await?;
        let log = pick_log(&logs, receipt.transaction_hash)
            .ok_or(MarketplaceError::MissingEvent(E::SIGNATURE))?;
        decode::<E>(log)
    }
}

fn pick_log(logs: &[Log], tx_hash: TxHash) -> Option<&Log> {
    if let Some(own) = logs.iter().find(|log| log.transaction_hash == Some(tx_hash)) {
        return Some(own);
    }
    if logs.iter().all(|log| log.transaction_hash.is_none()) {
        return logs.first();
    }
    None
}

/// Decode a log as event `E`.
pub fn decode<E: SolEvent>(log: &Log) -> MarketplaceResult<E> {
    log.log_decode::<E>()
        .map(|decoded| decoded.inner.data)
        .map_err(|e| MarketplaceError::Decode(format!("{}: {}", E::SIGNATURE, e)))
}
