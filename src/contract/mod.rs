//! Marketplace contract bindings and call building.
//!
//! # Data Flow
//! ```text
//! operation inputs
//!     → hash.rs (keccak256 over packed canonical fields, signed by the wallet)
//!     → abi.rs (sol! call encoding)
//!     → builder.rs (nonce + gas → TransactionParameters)
//! ```

pub mod abi;
pub mod builder;
pub mod hash;

pub use abi::IMarketplace::{NFTData as NftData, ProjectData, Royalty};
pub use builder::{GasStrategy, TxBuilder};
