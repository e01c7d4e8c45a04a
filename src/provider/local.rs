//! Local key wallet provider.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized
//!
//! Account, signing and sending requests are answered with the local key;
//! every other request (chain id, receipts, logs, gas) goes to the upstream
//! provider, which also broadcasts the signed raw transaction.

use std::sync::Arc;

use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, U128, U64};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::provider::WalletProvider;
use crate::transaction::types::TransactionParameters;
use crate::types::{MarketplaceError, MarketplaceResult};

/// EIP-1193 "unauthorized" code, used when a request names a foreign account.
const UNAUTHORIZED: i64 = 4100;

/// Wallet provider backed by a private key held in memory.
#[derive(Clone)]
pub struct LocalWalletProvider {
    signer: PrivateKeySigner,
    wallet: EthereumWallet,
    upstream: Arc<dyn WalletProvider>,
}

impl LocalWalletProvider {
    /// Create a provider from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    /// * `upstream` - Provider used for chain reads and broadcasting
    pub fn from_private_key(
        private_key_hex: &str,
        upstream: Arc<dyn WalletProvider>,
    ) -> MarketplaceResult<Self> {
        let key_hex = private_key_hex
            .trim()
            .strip_prefix("0x")
            .unwrap_or(private_key_hex.trim());

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| MarketplaceError::Wallet(format!("Invalid private key format: {}", e)))?;

        tracing::info!(address = %signer.address(), "Local wallet initialized");

        Ok(Self {
            wallet: EthereumWallet::from(signer.clone()),
            signer,
            upstream,
        })
    }

    /// Load the key from `env_var`.
    pub fn from_env(env_var: &str, upstream: Arc<dyn WalletProvider>) -> MarketplaceResult<Self> {
        let private_key = std::env::var(env_var).map_err(|_| {
            MarketplaceError::Wallet(format!("Environment variable {} not set", env_var))
        })?;

        Self::from_private_key(&private_key, upstream)
    }

    /// The wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    fn ensure_own_account(&self, account: Address) -> MarketplaceResult<()> {
        if account != self.address() {
            return Err(MarketplaceError::Provider {
                code: UNAUTHORIZED,
                message: format!("Account {} is not managed by this wallet", account),
            });
        }
        Ok(())
    }

    async fn upstream_call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> MarketplaceResult<T> {
        self.upstream.as_ref().call(method, params).await
    }

    /// `personal_sign`: `[data, address]`, data hex encoded or plain text.
    async fn personal_sign(&self, params: Value) -> MarketplaceResult<Value> {
        let data = params
            .get(0)
            .and_then(Value::as_str)
            .ok_or_else(|| MarketplaceError::Decode("personal_sign: missing data".to_string()))?;
        let account: Address = params
            .get(1)
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| MarketplaceError::Decode(format!("personal_sign: {}", e)))?
            .ok_or_else(|| MarketplaceError::Decode("personal_sign: missing address".to_string()))?;
        self.ensure_own_account(account)?;

        let message = if data.starts_with("0x") {
            alloy::hex::decode(data)
                .map_err(|e| MarketplaceError::Decode(format!("personal_sign: {}", e)))?
        } else {
            data.as_bytes().to_vec()
        };

        let signature = self
            .signer
            .sign_message(&message)
            .await
            .map_err(|e| MarketplaceError::Wallet(format!("Message signing failed: {}", e)))?;

        Ok(json!(Bytes::copy_from_slice(&signature.as_bytes())))
    }

    /// `eth_sendTransaction`: fill missing gas fields, sign, broadcast raw.
    async fn send_transaction(&self, params: Value) -> MarketplaceResult<Value> {
        let tx: TransactionParameters = params
            .get(0)
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| MarketplaceError::Decode(format!("eth_sendTransaction: {}", e)))?
            .ok_or_else(|| {
                MarketplaceError::Decode("eth_sendTransaction: missing transaction".to_string())
            })?;
        self.ensure_own_account(tx.from)?;

        let chain_id: U64 = self.upstream_call("eth_chainId", json!([])).await?;
        let gas_limit = match tx.gas {
            Some(gas) => gas,
            None => self.upstream_call("eth_estimateGas", json!([&tx])).await?,
        };
        let gas_price = match tx.gas_price {
            Some(price) => price,
            None => self.upstream_call::<U128>("eth_gasPrice", json!([])).await?,
        };

        let mut request = TransactionRequest::default()
            .with_from(tx.from)
            .with_to(tx.to)
            .with_nonce(tx.nonce.to::<u64>())
            .with_input(tx.data.clone())
            .with_chain_id(chain_id.to::<u64>())
            .with_gas_limit(gas_limit.to::<u64>())
            .with_gas_price(gas_price.to::<u128>());
        if let Some(value) = tx.value {
            request = request.with_value(value);
        }

        let envelope = request
            .build(&self.wallet)
            .await
            .map_err(|e| MarketplaceError::Wallet(format!("Transaction signing failed: {}", e)))?;
        let raw = Bytes::from(envelope.encoded_2718());

        tracing::debug!(from = %tx.from, to = %tx.to, nonce = %tx.nonce, "Broadcasting signed transaction");
        self.upstream
            .request("eth_sendRawTransaction", json!([raw]))
            .await
    }
}

impl std::fmt::Debug for LocalWalletProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalWalletProvider")
            .field("address", &self.address())
            .field("upstream", &self.upstream)
            .finish()
    }
}

#[async_trait]
impl WalletProvider for LocalWalletProvider {
    async fn request(&self, method: &str, params: Value) -> MarketplaceResult<Value> {
        match method {
            "eth_requestAccounts" | "eth_accounts" => Ok(json!([self.address()])),
            "personal_sign" => self.personal_sign(params).await,
            "eth_sendTransaction" => self.send_transaction(params).await,
            // Nothing to revoke for a key held in memory.
            "wallet_revokePermissions" => Ok(Value::Null),
            _ => self.upstream.request(method, params).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::testing::ScriptedProvider;
    use alloy::primitives::{Signature, B256, U256};

    // Well-known test private key (Anvil's first account)
    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    fn provider_with(upstream: Arc<ScriptedProvider>) -> LocalWalletProvider {
        LocalWalletProvider::from_private_key(TEST_PRIVATE_KEY, upstream).unwrap()
    }

    #[test]
    fn test_wallet_from_private_key() {
        let provider = provider_with(Arc::new(ScriptedProvider::new()));
        assert_eq!(provider.address().to_string().to_lowercase(), TEST_ADDRESS);
    }

    #[test]
    fn test_wallet_with_0x_prefix() {
        let provider = LocalWalletProvider::from_private_key(
            &format!("0x{}", TEST_PRIVATE_KEY),
            Arc::new(ScriptedProvider::new()),
        )
        .unwrap();
        assert_eq!(provider.address().to_string().to_lowercase(), TEST_ADDRESS);
    }

    #[test]
    fn test_invalid_private_key() {
        let result =
            LocalWalletProvider::from_private_key("invalid_key", Arc::new(ScriptedProvider::new()));
        assert!(result.unwrap_err().to_string().contains("Invalid private key"));
    }

    #[tokio::test]
    async fn test_accounts_are_local() {
        let upstream = Arc::new(ScriptedProvider::new());
        let provider = provider_with(upstream.clone());

        let accounts = provider.request("eth_requestAccounts", json!([])).await.unwrap();
        assert_eq!(accounts, json!([provider.address()]));
        assert!(upstream.calls().is_empty());
    }

    #[tokio::test]
    async fn test_personal_sign_recovers_to_wallet() {
        let provider = provider_with(Arc::new(ScriptedProvider::new()));
        let hash = B256::repeat_byte(0xab);

        let result = provider
            .request("personal_sign", json!([hash, provider.address()]))
            .await
            .unwrap();
        let bytes: Bytes = serde_json::from_value(result).unwrap();
        assert_eq!(bytes.len(), 65);

        let signature = Signature::try_from(bytes.as_ref()).unwrap();
        let recovered = signature.recover_address_from_msg(hash.as_slice()).unwrap();
        assert_eq!(recovered, provider.address());
    }

    #[tokio::test]
    async fn test_personal_sign_rejects_foreign_account() {
        let provider = provider_with(Arc::new(ScriptedProvider::new()));
        let err = provider
            .request("personal_sign", json!(["hello", Address::ZERO]))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketplaceError::Provider { code: 4100, .. }));
    }

    #[tokio::test]
    async fn test_send_transaction_signs_and_broadcasts() {
        let upstream = Arc::new(ScriptedProvider::new());
        upstream
            .respond("eth_chainId", json!("0x7a69"))
            .respond("eth_gasPrice", json!("0x3b9aca00"))
            .respond("eth_sendRawTransaction", json!(B256::repeat_byte(0x11)));
        let provider = provider_with(upstream.clone());

        let tx = TransactionParameters {
            from: provider.address(),
            to: Address::repeat_byte(0x22),
            nonce: U64::from(7),
            gas: Some(U64::from(100_000)),
            gas_price: None,
            value: Some(U256::from(1_000u64)),
            data: Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]),
        };
        let result = provider
            .request("eth_sendTransaction", json!([tx]))
            .await
            .unwrap();
        assert_eq!(result, json!(B256::repeat_byte(0x11)));

        assert!(upstream.calls_to("eth_estimateGas").is_empty());
        let raw = upstream.calls_to("eth_sendRawTransaction");
        assert_eq!(raw.len(), 1);
        assert!(raw[0][0].as_str().unwrap().starts_with("0x"));
    }

    #[tokio::test]
    async fn test_reads_go_upstream() {
        let upstream = Arc::new(ScriptedProvider::new());
        upstream.respond("eth_blockNumber", json!("0x10"));
        let provider = provider_with(upstream.clone());

        let block = provider.request("eth_blockNumber", json!([])).await.unwrap();
        assert_eq!(block, json!("0x10"));
        assert_eq!(upstream.calls_to("eth_blockNumber").len(), 1);
    }
}
