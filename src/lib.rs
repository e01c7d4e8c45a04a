//! Marketplace wallet and contract integration.
//!
//! Connects an application to a user's wallet provider and the NFT
//! marketplace contract: account access, message signing, contract call
//! encoding, submission, receipt polling and event decoding.
//!
//! # Architecture Overview
//!
//! ```text
//!     ┌──────────────────────────────────────────────────────────────┐
//!     │                        marketplace                           │
//!     │  create_nft · mint_nfts · change_selling_config · buy_nft    │
//!     │  create_project · fund_project · withdraw_project_funds      │
//!     └──────┬──────────────┬────────────────┬───────────────┬───────┘
//!            ▼              ▼                ▼               ▼
//!       ┌─────────┐   ┌──────────┐    ┌─────────────┐   ┌─────────┐
//!       │ wallet  │   │ contract │    │ transaction │   │ backend │
//!       │connector│   │ hash+abi │    │submit+poll+ │   │rollback │
//!       │ signer  │   │ builder  │    │   events    │   │         │
//!       └────┬────┘   └────┬─────┘    └──────┬──────┘   └─────────┘
//!            └─────────────┴────────┬────────┘
//!                                   ▼
//!                        ┌───────────────────────┐
//!                        │       provider        │
//!                        │ http · local · events │
//!                        └───────────────────────┘
//! ```

// Wallet and chain access
pub mod provider;
pub mod transaction;
pub mod wallet;

// Marketplace domain
pub mod backend;
pub mod contract;
pub mod marketplace;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod notify;
pub mod observability;
pub mod types;

pub use config::MarketplaceConfig;
pub use lifecycle::Shutdown;
pub use marketplace::Marketplace;
pub use types::{MarketplaceError, MarketplaceResult};
