//! Shared types and error definitions.

use alloy::primitives::TxHash;
use thiserror::Error;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur while talking to the wallet, the chain or the backend.
#[derive(Debug, Error)]
pub enum MarketplaceError {
    /// No wallet provider is configured or reachable.
    #[error("No wallet provider found")]
    ProviderUnavailable,

    /// The wallet exposes no accounts.
    #[error("Please connect your wallet account first")]
    NotConnected,

    /// Transport-level JSON-RPC failure.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The provider answered with a JSON-RPC error object.
    #[error("{message} (code {code})")]
    Provider { code: i64, message: String },

    /// The wallet is on the wrong network.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// An ether amount could not be parsed.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Gas price exceeded maximum allowed.
    #[error("Gas price {current_gwei} gwei exceeds maximum {max_gwei} gwei")]
    GasPriceTooHigh { current_gwei: u64, max_gwei: u64 },

    /// Transaction was mined but reverted.
    #[error("Transaction {0} reverted")]
    Reverted(TxHash),

    /// The expected contract event was not found after confirmation.
    #[error("Event {0} not found")]
    MissingEvent(&'static str),

    /// A provider response could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Invalid private key or local signing failure.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Backend HTTP call failed.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Waiting for a receipt exceeded the deadline.
    #[error("Transaction not confirmed after {0} seconds")]
    Timeout(u64),

    /// The configuration failed validation.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl MarketplaceError {
    /// Text suitable for a user-facing notification.
    ///
    /// Wallet errors often append a JSON blob to the message, so only the part
    /// before the first `{` is kept. Falls back to `fallback` when nothing
    /// readable remains.
    pub fn user_message(&self, fallback: &str) -> String {
        let text = self.to_string();
        let head = text.split('{').next().unwrap_or_default().trim();
        if head.is_empty() {
            fallback.to_string()
        } else {
            head.to_string()
        }
    }

    /// Whether the user declined the request in the wallet (EIP-1193 code 4001).
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, MarketplaceError::Provider { code: 4001, .. })
    }
}

/// Result type for marketplace operations.
pub type MarketplaceResult<T> = Result<T, MarketplaceError>;
