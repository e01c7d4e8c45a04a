//! Wallet provider subsystem.
//!
//! # Data Flow
//! ```text
//! MarketplaceConfig + MARKETPLACE_PRIVATE_KEY
//!     → accessor.rs (detect a provider, or report none)
//!     → http.rs (JSON-RPC over HTTP to a wallet bridge or node)
//!     → local.rs (local key answers account/sign/send, reads go upstream)
//!     → events.rs (accountsChanged / chainChanged notifications)
//! ```
//!
//! Every provider speaks the EIP-1193 `request({ method, params })` surface,
//! so the rest of the crate never knows which one it is talking to.

pub mod accessor;
pub mod events;
pub mod http;
pub mod local;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::types::{MarketplaceError, MarketplaceResult};

pub use accessor::{detect_provider, PRIVATE_KEY_ENV_VAR};
pub use events::{ProviderEvent, ProviderEventWatcher};
pub use http::HttpProvider;
pub use local::LocalWalletProvider;

/// An EIP-1193 style wallet provider.
#[async_trait]
pub trait WalletProvider: Send + Sync + std::fmt::Debug {
    /// Issue a single request and return the raw JSON result.
    async fn request(&self, method: &str, params: Value) -> MarketplaceResult<Value>;
}

impl dyn WalletProvider {
    /// Issue a request and deserialize its result.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> MarketplaceResult<T> {
        let value = self.request(method, params).await?;
        serde_json::from_value(value)
            .map_err(|e| MarketplaceError::Decode(format!("{}: {}", method, e)))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted in-memory provider for unit tests.

    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use super::*;

    /// Replays queued responses per method and records every call.
    #[derive(Debug, Default)]
    pub struct ScriptedProvider {
        responses: Mutex<HashMap<String, VecDeque<MarketplaceResult<Value>>>>,
        calls: Mutex<Vec<(String, Value)>>,
    }

    impl ScriptedProvider {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a successful result for `method`. The last queued result repeats.
        pub fn respond(&self, method: &str, result: Value) -> &Self {
            self.push(method, Ok(result))
        }

        /// Queue an error for `method`.
        pub fn fail(&self, method: &str, error: MarketplaceError) -> &Self {
            self.push(method, Err(error))
        }

        fn push(&self, method: &str, result: MarketplaceResult<Value>) -> &Self {
            self.responses
                .lock()
                .unwrap()
                .entry(method.to_string())
                .or_default()
                .push_back(result);
            self
        }

        pub fn calls(&self) -> Vec<(String, Value)> {
            self.calls.lock().unwrap().clone()
        }

        pub fn calls_to(&self, method: &str) -> Vec<Value> {
            self.calls()
                .into_iter()
                .filter(|(m, _)| m == method)
                .map(|(_, params)| params)
                .collect()
        }
    }

    fn clone_result(result: &MarketplaceResult<Value>) -> MarketplaceResult<Value> {
        match result {
            Ok(v) => Ok(v.clone()),
            Err(e) => Err(MarketplaceError::Rpc(e.to_string())),
        }
    }

    #[async_trait]
    impl WalletProvider for ScriptedProvider {
        async fn request(&self, method: &str, params: Value) -> MarketplaceResult<Value> {
            self.calls
                .lock()
                .unwrap()
                .push((method.to_string(), params));

            let mut responses = self.responses.lock().unwrap();
            let queue = responses
                .get_mut(method)
                .ok_or_else(|| MarketplaceError::Rpc(format!("unscripted method {}", method)))?;
            if queue.len() > 1 {
                queue.pop_front().unwrap()
            } else {
                clone_result(queue.front().unwrap())
            }
        }
    }
}
