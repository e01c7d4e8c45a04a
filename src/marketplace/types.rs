//! Inputs and results of marketplace operations.

use alloy::primitives::utils::parse_ether;
use alloy::primitives::{TxHash, U256};
use serde::{Deserialize, Serialize};

use crate::types::{MarketplaceError, MarketplaceResult};

/// A newly created item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedNft {
    pub token_id: U256,
    pub tx_hash: TxHash,
}

/// Tokens minted by one `mintNFTs` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MintedNfts {
    pub token_ids: Vec<U256>,
    pub tx_hash: TxHash,
}

/// A newly created funding project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedProject {
    pub project_id: U256,
    pub tx_hash: TxHash,
}

/// Project details as entered by the user. The owner is always the
/// connected account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub meta_data: String,
    /// Budget in ether, e.g. `"2.5"`.
    pub budget: String,
    /// Unix timestamp.
    pub deadline: U256,
}

/// Parse a decimal ether amount into wei.
pub fn parse_eth(amount: &str) -> MarketplaceResult<U256> {
    parse_ether(amount.trim())
        .map_err(|e| MarketplaceError::InvalidAmount(format!("'{}': {}", amount, e)))
}
