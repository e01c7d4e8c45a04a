//! Account and network change notifications.
//!
//! An injected browser wallet pushes `accountsChanged` and `chainChanged`.
//! Over JSON-RPC there is no push channel, so the watcher polls
//! `eth_accounts` and `eth_chainId` at a fixed interval and broadcasts the
//! differences. The first poll only records a baseline.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, U64};
use serde_json::json;
use tokio::sync::broadcast;
use tokio::time;

use crate::provider::WalletProvider;
use crate::types::MarketplaceResult;

/// A change reported by the wallet provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The set of exposed accounts changed (empty when the wallet locked).
    AccountsChanged(Vec<Address>),
    /// The active network changed.
    ChainChanged(u64),
}

/// Polls the provider and broadcasts `ProviderEvent`s.
pub struct ProviderEventWatcher {
    provider: Arc<dyn WalletProvider>,
    interval: Duration,
    tx: broadcast::Sender<ProviderEvent>,
    last_accounts: Option<Vec<Address>>,
    last_chain: Option<u64>,
}

impl ProviderEventWatcher {
    /// Create a watcher polling every `interval`.
    pub fn new(provider: Arc<dyn WalletProvider>, interval: Duration) -> Self {
        let (tx, _) = broadcast::channel(16);
        Self {
            provider,
            interval,
            tx,
            last_accounts: None,
            last_chain: None,
        }
    }

    /// Subscribe to change events.
    pub fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.tx.subscribe()
    }

    /// Run the polling loop until shutdown is signalled.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "Provider event watcher starting");

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.poll_once().await {
                        Ok(events) => {
                            for event in events {
                                tracing::debug!(?event, "Provider event");
                                let _ = self.tx.send(event);
                            }
                        }
                        Err(e) => tracing::warn!(error = %e, "Failed to poll provider state"),
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Provider event watcher received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Query the provider once and return the changes since the last poll.
    pub async fn poll_once(&mut self) -> MarketplaceResult<Vec<ProviderEvent>> {
        let accounts: Vec<Address> = self.provider.call("eth_accounts", json!([])).await?;
        let chain_id: U64 = self.provider.call("eth_chainId", json!([])).await?;
        let chain_id = chain_id.to::<u64>();

        let mut events = Vec::new();

        match &self.last_accounts {
            Some(previous) if *previous != accounts => {
                events.push(ProviderEvent::AccountsChanged(accounts.clone()));
            }
            _ => {}
        }
        match self.last_chain {
            Some(previous) if previous != chain_id => {
                events.push(ProviderEvent::ChainChanged(chain_id));
            }
            _ => {}
        }

        self.last_accounts = Some(accounts);
        self.last_chain = Some(chain_id);
        Ok(events)
    }
}
