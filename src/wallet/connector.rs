//! Wallet connection and network checks.

use std::sync::Arc;

use alloy::primitives::utils::format_ether;
use alloy::primitives::{Address, U256, U64};
use serde_json::json;

use crate::config::NetworkConfig;
use crate::notify::Notifier;
use crate::provider::WalletProvider;
use crate::types::{ChainId, MarketplaceError, MarketplaceResult};

/// Message shown while the wallet is on another network.
pub fn chain_mismatch_message(chain_name: &str) -> String {
    format!(
        "Please switch to {} in order to use all features of Marketplace",
        chain_name
    )
}

/// Requests account access and checks the active network.
#[derive(Clone)]
pub struct WalletConnector {
    provider: Arc<dyn WalletProvider>,
    network: NetworkConfig,
    notifier: Arc<dyn Notifier>,
}

impl WalletConnector {
    pub fn new(
        provider: Arc<dyn WalletProvider>,
        network: NetworkConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            provider,
            network,
            notifier,
        }
    }

    /// Request account access and return the active account.
    ///
    /// A wrong network is reported to the user; it only fails the call when
    /// `strict_chain` is set.
    pub async fn connect(&self) -> MarketplaceResult<Address> {
        let accounts: Vec<Address> = self
            .provider
            .call("eth_requestAccounts", json!([]))
            .await?;
        let account = accounts
            .first()
            .copied()
            .ok_or(MarketplaceError::NotConnected)?;

        let chain_id = self.chain_id().await?;
        if chain_id.0 != self.network.required_chain_id {
            let message = chain_mismatch_message(&self.network.required_chain_name);
            tracing::warn!(
                expected = self.network.required_chain_id,
                actual = chain_id.0,
                "Wallet is on the wrong network"
            );
            self.notifier.error(&message);

            if self.network.strict_chain {
                return Err(MarketplaceError::ChainMismatch {
                    expected: self.network.required_chain_id,
                    actual: chain_id.0,
                });
            }
        }

        tracing::debug!(account = %account, chain_id = chain_id.0, "Wallet connected");
        Ok(account)
    }

    /// The wallet's active network.
    pub async fn chain_id(&self) -> MarketplaceResult<ChainId> {
        let chain_id: U64 = self.provider.call("eth_chainId", json!([])).await?;
        Ok(ChainId(chain_id.to::<u64>()))
    }

    /// Accounts already exposed to the application, without prompting.
    pub async fn accounts(&self) -> MarketplaceResult<Vec<Address>> {
        self.provider.call("eth_accounts", json!([])).await
    }

    /// Whether the wallet exposes at least one account.
    pub async fn is_connected(&self) -> MarketplaceResult<bool> {
        let connected = !self.accounts().await?.is_empty();
        if !connected {
            self.notifier
                .error(&MarketplaceError::NotConnected.to_string());
        }
        Ok(connected)
    }

    /// Ask the wallet to drop the application's account permission.
    pub async fn disconnect(&self) -> MarketplaceResult<()> {
        self.provider
            .request(
                "wallet_revokePermissions",
                json!([{ "eth_accounts": {} }]),
            )
            .await?;
        tracing::info!("Wallet disconnected");
        Ok(())
    }

    /// Balance of the first exposed account, formatted as `"<ether> ETH"`.
    pub async fn balance(&self) -> MarketplaceResult<String> {
        let account = self
            .accounts()
            .await?
            .first()
            .copied()
            .ok_or(MarketplaceError::NotConnected)?;
        let balance: U256 = self
            .provider
            .call("eth_getBalance", json!([account, "latest"]))
            .await?;
        Ok(format!("{} ETH", format_ether(balance)))
    }
}

impl std::fmt::Debug for WalletConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletConnector")
            .field("provider", &self.provider)
            .field("required_chain_id", &self.network.required_chain_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{ChannelNotifier, Notification};
    use crate::provider::testing::ScriptedProvider;

    const ALICE: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";

    fn network(strict: bool) -> NetworkConfig {
        NetworkConfig {
            required_chain_id: 31337,
            required_chain_name: "Anvil".to_string(),
            strict_chain: strict,
        }
    }

    fn connector(
        scripted: Arc<ScriptedProvider>,
        strict: bool,
    ) -> (WalletConnector, tokio::sync::mpsc::UnboundedReceiver<Notification>) {
        let (notifier, rx) = ChannelNotifier::new();
        (
            WalletConnector::new(scripted, network(strict), Arc::new(notifier)),
            rx,
        )
    }

    #[tokio::test]
    async fn test_connect_returns_first_account() {
        let scripted = Arc::new(ScriptedProvider::new());
        scripted
            .respond("eth_requestAccounts", json!([ALICE, Address::ZERO]))
            .respond("eth_chainId", json!("0x7a69"));
        let (connector, mut rx) = connector(scripted, false);

        let account = connector.connect().await.unwrap();
        assert_eq!(account, ALICE.parse::<Address>().unwrap());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_wrong_chain_warns_but_connects() {
        let scripted = Arc::new(ScriptedProvider::new());
        scripted
            .respond("eth_requestAccounts", json!([ALICE]))
            .respond("eth_chainId", json!("0x1"));
        let (connector, mut rx) = connector(scripted, false);

        assert!(connector.connect().await.is_ok());
        assert_eq!(
            rx.try_recv().unwrap(),
            Notification::Error(
                "Please switch to Anvil in order to use all features of Marketplace".into()
            )
        );
    }

    #[tokio::test]
    async fn test_wrong_chain_strict_fails() {
        let scripted = Arc::new(ScriptedProvider::new());
        scripted
            .respond("eth_requestAccounts", json!([ALICE]))
            .respond("eth_chainId", json!("0x1"));
        let (connector, _rx) = connector(scripted, true);

        let err = connector.connect().await.unwrap_err();
        assert!(matches!(
            err,
            MarketplaceError::ChainMismatch {
                expected: 31337,
                actual: 1
            }
        ));
    }

    #[tokio::test]
    async fn test_no_accounts() {
        let scripted = Arc::new(ScriptedProvider::new());
        scripted.respond("eth_requestAccounts", json!([]));
        let (connector, _rx) = connector(scripted, false);

        assert!(matches!(
            connector.connect().await.unwrap_err(),
            MarketplaceError::NotConnected
        ));
    }

    #[tokio::test]
    async fn test_is_connected_notifies_when_locked() {
        let scripted = Arc::new(ScriptedProvider::new());
        scripted.respond("eth_accounts", json!([]));
        let (connector, mut rx) = connector(scripted, false);

        assert!(!connector.is_connected().await.unwrap());
        assert!(matches!(rx.try_recv().unwrap(), Notification::Error(_)));
    }

    #[tokio::test]
    async fn test_balance_formatting() {
        let scripted = Arc::new(ScriptedProvider::new());
        scripted
            .respond("eth_accounts", json!([ALICE]))
            // 1.5 ether
            .respond("eth_getBalance", json!("0x14d1120d7b160000"));
        let (connector, _rx) = connector(scripted, false);

        assert_eq!(connector.balance().await.unwrap(), "1.500000000000000000 ETH");
    }
}
