//! Marketplace operations.
//!
//! # Data Flow
//! ```text
//! operation
//!     → wallet::connector (account access + network check)
//!     → contract::hash + wallet::signer (content hash signature)
//!     → contract::builder (ABI data, nonce, gas)
//!     → transaction::submitter → transaction::receipt → transaction::events
//!     → result, or log + notify (+ backend rollback) and a falsy value
//! ```

pub mod client;
pub mod types;

pub use client::Marketplace;
pub use types::{parse_eth, CreatedNft, CreatedProject, MintedNfts, NewProject};
