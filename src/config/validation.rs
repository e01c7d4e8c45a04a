//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that URLs and the contract address parse
//! - Validate value ranges (timeouts > 0, multiplier > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MarketplaceConfig → Result<(), Vec<ValidationError>>

use alloy::primitives::Address;
use std::fmt;

use crate::config::schema::MarketplaceConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Check a parsed configuration, collecting every error.
pub fn validate_config(config: &MarketplaceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.contract.address.trim().is_empty() {
        errors.push(ValidationError::new("contract.address", "must be set"));
    } else if let Err(e) = config.contract.address.parse::<Address>() {
        errors.push(ValidationError::new(
            "contract.address",
            format!("invalid address: {}", e),
        ));
    }

    if let Some(provider_url) = &config.wallet.provider_url {
        if let Err(e) = url::Url::parse(provider_url) {
            errors.push(ValidationError::new(
                "wallet.provider_url",
                format!("invalid URL '{}': {}", provider_url, e),
            ));
        }
    }

    if let Some(base_url) = &config.backend.base_url {
        if let Err(e) = url::Url::parse(base_url) {
            errors.push(ValidationError::new(
                "backend.base_url",
                format!("invalid URL '{}': {}", base_url, e),
            ));
        }
    }

    if config.wallet.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("wallet.rpc_timeout_secs", "must be > 0"));
    }
    if config.wallet.event_poll_interval_ms == 0 {
        errors.push(ValidationError::new(
            "wallet.event_poll_interval_ms",
            "must be > 0",
        ));
    }
    if config.contract.receipt_poll_interval_ms == 0 {
        errors.push(ValidationError::new(
            "contract.receipt_poll_interval_ms",
            "must be > 0",
        ));
    }
    if !(config.contract.gas_price_multiplier > 0.0) {
        errors.push(ValidationError::new(
            "contract.gas_price_multiplier",
            "must be > 0",
        ));
    }
    if config.app.name.trim().is_empty() {
        errors.push(ValidationError::new("app.name", "must not be empty"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
