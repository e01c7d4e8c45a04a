//! Content hashes the wallet signs before a contract call.
//!
//! Each hash is `keccak256(abi.encodePacked(...))` over the operation's
//! canonical fields, the same value Solidity's `keccak256(abi.encodePacked())`
//! produces for those arguments.

use alloy::primitives::{keccak256, Address, B256, U256};
use alloy::sol_types::SolValue;

use crate::contract::{NftData, ProjectData};

/// Hash over an item's creator and metadata.
pub fn nft_hash(nft: &NftData) -> B256 {
    keccak256((nft.creator, nft.metaData.clone()).abi_encode_packed())
}

/// Hash over a purchase: the item and both parties it pays.
pub fn purchase_hash(nft_id: U256, owner: Address, creator: Address) -> B256 {
    keccak256((nft_id, owner, creator).abi_encode_packed())
}

/// Hash over a project's owner, metadata and budget (in wei).
pub fn project_hash(project: &ProjectData) -> B256 {
    keccak256((project.owner, project.metaData.clone(), project.budget).abi_encode_packed())
}

/// Hash over a project id and the account acting on it.
pub fn project_action_hash(project_id: U256, sender: Address) -> B256 {
    keccak256((project_id, sender).abi_encode_packed())
}
