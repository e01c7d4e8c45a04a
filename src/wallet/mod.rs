//! Wallet-facing operations.
//!
//! # Data Flow
//! ```text
//! connector.rs  eth_requestAccounts + eth_chainId → active account
//! signer.rs     personal_sign over the login message or a content hash
//! session.rs    provider events → WalletStatus (watch channel)
//! ```

pub mod connector;
pub mod session;
pub mod signer;

pub use connector::{chain_mismatch_message, WalletConnector};
pub use session::{WalletSession, WalletStatus};
pub use signer::MessageSigner;
