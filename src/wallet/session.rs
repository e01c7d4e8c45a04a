//! Wallet session state driven by provider events.
//!
//! Account changes end the session: the cached account is dropped and the
//! UI is expected to send the user back to the wallet screen. Network
//! changes set or clear the wallet error.

use alloy::primitives::Address;
use tokio::sync::{broadcast, watch};

use crate::config::NetworkConfig;
use crate::provider::ProviderEvent;
use crate::wallet::connector::chain_mismatch_message;

/// Snapshot published to observers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletStatus {
    /// Account of the current session, if any.
    pub account: Option<Address>,
    /// Last network reported by the wallet.
    pub chain_id: Option<u64>,
    /// Error to display, e.g. wrong network.
    pub error: Option<String>,
    /// Set once the accounts changed; the user must reconnect.
    pub session_cleared: bool,
}

/// Holds the wallet status and applies provider events to it.
#[derive(Debug)]
pub struct WalletSession {
    network: NetworkConfig,
    tx: watch::Sender<WalletStatus>,
}

impl WalletSession {
    pub fn new(network: NetworkConfig) -> Self {
        let (tx, _) = watch::channel(WalletStatus::default());
        Self { network, tx }
    }

    /// Observe status changes.
    pub fn subscribe(&self) -> watch::Receiver<WalletStatus> {
        self.tx.subscribe()
    }

    /// Current status.
    pub fn status(&self) -> WalletStatus {
        self.tx.borrow().clone()
    }

    /// Record a freshly connected account.
    pub fn set_account(&self, account: Address) {
        self.tx.send_modify(|status| {
            status.account = Some(account);
            status.session_cleared = false;
        });
    }

    /// Set or clear the wallet error.
    pub fn set_error(&self, error: Option<String>) {
        self.tx.send_modify(|status| status.error = error);
    }

    /// Apply one provider event.
    pub fn apply(&self, event: &ProviderEvent) {
        match event {
            ProviderEvent::AccountsChanged(accounts) => {
                tracing::info!(accounts = accounts.len(), "Wallet accounts changed, clearing session");
                self.tx.send_modify(|status| {
                    status.account = None;
                    status.session_cleared = true;
                });
            }
            ProviderEvent::ChainChanged(chain_id) => {
                let error = if *chain_id == self.network.required_chain_id {
                    None
                } else {
                    Some(chain_mismatch_message(&self.network.required_chain_name))
                };
                tracing::info!(chain_id, wrong_network = error.is_some(), "Wallet network changed");
                self.tx.send_modify(|status| {
                    status.chain_id = Some(*chain_id);
                    status.error = error;
                });
            }
        }
    }

    /// Apply events until the stream closes or shutdown is signalled.
    pub async fn run(
        &self,
        mut events: broadcast::Receiver<ProviderEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(event) => self.apply(&event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Wallet session lagged behind provider events");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                _ = shutdown.recv() => break,
            }
        }
    }
}
