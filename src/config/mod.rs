//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! marketplace.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → MarketplaceConfig (validated, immutable)
//!     → handed to Marketplace and the provider accessor
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Private keys never live in the config file

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AppConfig, BackendConfig, ContractConfig, MarketplaceConfig, NetworkConfig,
    ObservabilityConfig, WalletConfig,
};
pub use validation::{validate_config, ValidationError};
