//! Transaction submission and confirmation.
//!
//! # Data Flow
//! ```text
//! TransactionParameters
//!     → submitter.rs (eth_sendTransaction → tx hash)
//!     → receipt.rs (poll eth_getTransactionReceipt at a fixed interval)
//!     → events.rs (eth_getLogs from the receipt's block, decode)
//! ```

pub mod events;
pub mod receipt;
pub mod submitter;
pub mod types;

pub use events::EventExtractor;
pub use receipt::ReceiptPoller;
pub use submitter::TransactionSubmitter;
pub use types::TransactionParameters;
