//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the marketplace client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MarketplaceConfig {
    /// Application identity shown to the wallet.
    pub app: AppConfig,

    /// Wallet provider connection.
    pub wallet: WalletConfig,

    /// Network the marketplace contract is deployed on.
    pub network: NetworkConfig,

    /// Marketplace contract and transaction settings.
    pub contract: ContractConfig,

    /// Backend used for rollback calls.
    pub backend: BackendConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Application identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Name embedded in the login message the wallet signs.
    pub name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "Marketplace".to_string(),
        }
    }
}

/// Wallet provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// JSON-RPC endpoint of the wallet provider (or of the node a local key signs for).
    pub provider_url: Option<String>,

    /// Provider request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Interval for polling account and network changes, in milliseconds.
    pub event_poll_interval_ms: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            provider_url: None,
            rpc_timeout_secs: 30,
            event_poll_interval_ms: 2000,
        }
    }
}

/// Required network configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Chain ID the contract lives on (e.g., 1 for Ethereum mainnet, 31337 for local Anvil).
    pub required_chain_id: u64,

    /// Human readable network name used in messages.
    pub required_chain_name: String,

    /// Refuse to operate on the wrong network instead of only warning.
    pub strict_chain: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            required_chain_id: 1,
            required_chain_name: "Ethereum Mainnet".to_string(),
            strict_chain: false,
        }
    }
}

/// Marketplace contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Address of the marketplace contract.
    pub address: String,

    /// Fixed delay between receipt queries in milliseconds.
    pub receipt_poll_interval_ms: u64,

    /// Gas price multiplier (1.0 = node price, 1.2 = 20% buffer).
    pub gas_price_multiplier: f64,

    /// Maximum gas price in gwei (protection against spikes).
    pub max_gas_price_gwei: u64,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            receipt_poll_interval_ms: 4000,
            gas_price_multiplier: 1.0,
            max_gas_price_gwei: 500,
        }
    }
}

/// Backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the marketplace API; rollbacks are skipped when unset.
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
