//! Transaction request building.
//!
//! # Responsibilities
//! - Fetch the sender's nonce
//! - Estimate gas and price it with a safety multiplier, or leave gas to the wallet
//! - Refuse gas prices above the configured ceiling

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, U128, U256, U64};
use serde_json::json;

use crate::config::ContractConfig;
use crate::provider::WalletProvider;
use crate::transaction::types::TransactionParameters;
use crate::types::{MarketplaceError, MarketplaceResult};

const WEI_PER_GWEI: u128 = 1_000_000_000;

/// How gas fields are filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasStrategy {
    /// `eth_estimateGas` for the limit, `eth_gasPrice` × multiplier for the price.
    Estimate,
    /// Omit gas fields; the wallet decides (and lets the user adjust).
    WalletDefault,
}

/// Builds `TransactionParameters` for calls to the marketplace contract.
#[derive(Debug, Clone)]
pub struct TxBuilder {
    provider: Arc<dyn WalletProvider>,
    contract: Address,
    gas_price_multiplier: f64,
    max_gas_price_gwei: u64,
}

impl TxBuilder {
    /// Create a builder targeting `contract`.
    pub fn new(provider: Arc<dyn WalletProvider>, contract: Address, config: &ContractConfig) -> Self {
        Self {
            provider,
            contract,
            gas_price_multiplier: config.gas_price_multiplier,
            max_gas_price_gwei: config.max_gas_price_gwei,
        }
    }

    /// Build a transaction request.
    ///
    /// # Arguments
    /// * `from` - Sending account (must be the wallet's active account)
    /// * `value` - Native value in wei, if the call is payable
    /// * `data` - ABI encoded call
    /// * `gas` - How to fill gas fields
    pub async fn build(
        &self,
        from: Address,
        value: Option<U256>,
        data: Bytes,
        gas: GasStrategy,
    ) -> MarketplaceResult<TransactionParameters> {
        let nonce: U64 = self
            .provider
            .call("eth_getTransactionCount", json!([from, "latest"]))
            .await?;

        let mut tx = TransactionParameters {
            from,
            to: self.contract,
            nonce,
            gas: None,
            gas_price: None,
            value,
            data,
        };

        if gas == GasStrategy::Estimate {
            let gas_limit: U64 = self.provider.call("eth_estimateGas", json!([&tx])).await?;
            let gas_price: U128 = self.provider.call("eth_gasPrice", json!([])).await?;
            let gas_price = self.adjust_gas_price(gas_price.to::<u128>())?;

            tracing::debug!(gas_limit = %gas_limit, gas_price, "Gas estimated");
            tx.gas = Some(gas_limit);
            tx.gas_price = Some(U128::from(gas_price));
        }

        Ok(tx)
    }

    /// Apply the multiplier, then enforce the ceiling on the price that will be sent.
    fn adjust_gas_price(&self, gas_price: u128) -> MarketplaceResult<u128> {
        let adjusted = (gas_price as f64 * self.gas_price_multiplier) as u128;
        let adjusted_gwei = adjusted / WEI_PER_GWEI;
        if adjusted_gwei > self.max_gas_price_gwei as u128 {
            return Err(MarketplaceError::GasPriceTooHigh {
                current_gwei: u64::try_from(adjusted_gwei).unwrap_or(u64::MAX),
                max_gwei: self.max_gas_price_gwei,
            });
        }

        Ok(adjusted)
    }
}
