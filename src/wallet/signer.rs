//! Off-chain message signing through the wallet's `personal_sign`.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, B256};
use serde_json::json;

use crate::provider::WalletProvider;
use crate::types::{MarketplaceError, MarketplaceResult};

/// Requests personal-message signatures from the wallet.
#[derive(Debug, Clone)]
pub struct MessageSigner {
    provider: Arc<dyn WalletProvider>,
    app_name: String,
}

impl MessageSigner {
    pub fn new(provider: Arc<dyn WalletProvider>, app_name: impl Into<String>) -> Self {
        Self {
            provider,
            app_name: app_name.into(),
        }
    }

    /// The fixed message a user signs in place of a password.
    pub fn login_message(&self) -> String {
        format!(
            "{} uses this cryptographic signature in place of a password, verifying that you are the owner of this address.",
            self.app_name
        )
    }

    /// Sign the login message with the wallet's first account.
    pub async fn sign_login(&self) -> MarketplaceResult<Bytes> {
        let accounts: Vec<Address> = self.provider.call("eth_accounts", json!([])).await?;
        let address = accounts
            .first()
            .copied()
            .ok_or(MarketplaceError::NotConnected)?;

        let message = Bytes::from(self.login_message().into_bytes());
        self.personal_sign(message, address).await
    }

    /// Sign a 32-byte content hash.
    pub async fn sign_hash(&self, hash: B256, address: Address) -> MarketplaceResult<Bytes> {
        self.personal_sign(Bytes::copy_from_slice(hash.as_slice()), address)
            .await
    }

    async fn personal_sign(&self, message: Bytes, address: Address) -> MarketplaceResult<Bytes> {
        let signature: Bytes = self
            .provider
            .call("personal_sign", json!([message, address]))
            .await?;
        tracing::debug!(address = %address, len = signature.len(), "Message signed");
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::testing::ScriptedProvider;

    const ALICE: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";

    #[test]
    fn test_login_message() {
        let signer = MessageSigner::new(Arc::new(ScriptedProvider::new()), "Artline");
        assert!(signer
            .login_message()
            .starts_with("Artline uses this cryptographic signature in place of a password"));
    }

    #[tokio::test]
    async fn test_sign_login_sends_hex_utf8() {
        let scripted = Arc::new(ScriptedProvider::new());
        scripted
            .respond("eth_accounts", json!([ALICE]))
            .respond("personal_sign", json!(format!("0x{}", "11".repeat(65))));
        let signer = MessageSigner::new(scripted.clone(), "Artline");

        let signature = signer.sign_login().await.unwrap();
        assert_eq!(signature.len(), 65);

        let params = &scripted.calls_to("personal_sign")[0];
        let expected = Bytes::from(signer.login_message().into_bytes());
        assert_eq!(params[0], json!(expected));
        assert_eq!(params[1], json!(ALICE.parse::<Address>().unwrap()));
    }

    #[tokio::test]
    async fn test_sign_hash_passes_hash_hex() {
        let scripted = Arc::new(ScriptedProvider::new());
        scripted.respond("personal_sign", json!("0x1234"));
        let signer = MessageSigner::new(scripted.clone(), "Artline");
        let hash = B256::repeat_byte(0x42);

        signer.sign_hash(hash, Address::ZERO).await.unwrap();
        assert_eq!(scripted.calls_to("personal_sign")[0][0], json!(hash));
    }

    #[tokio::test]
    async fn test_sign_login_without_accounts() {
        let scripted = Arc::new(ScriptedProvider::new());
        scripted.respond("eth_accounts", json!([]));
        let signer = MessageSigner::new(scripted, "Artline");

        assert!(matches!(
            signer.sign_login().await.unwrap_err(),
            MarketplaceError::NotConnected
        ));
    }
}
