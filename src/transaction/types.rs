//! Transaction request parameters sent to the wallet provider.
//!
//! Receipts and logs use alloy's RPC types directly.

use alloy::primitives::{Address, Bytes, U128, U256, U64};
use serde::{Deserialize, Serialize};

/// Parameters of an `eth_sendTransaction` request.
///
/// Quantities serialize as `0x`-prefixed hex. Gas fields left as `None` are
/// omitted so the wallet fills them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionParameters {
    /// Must match the wallet's active account.
    pub from: Address,
    /// The marketplace contract.
    pub to: Address,
    pub nonce: U64,
    /// Gas limit.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "gasLimit")]
    pub gas: Option<U64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U128>,
    /// Native value in wei.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    /// ABI encoded call.
    #[serde(alias = "input")]
    pub data: Bytes,
}
