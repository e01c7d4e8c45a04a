//! Shared utilities for integration testing.
//!
//! `MockWallet` serves a JSON-RPC wallet endpoint on `/` and the backend
//! rollback endpoints on `/{resource}/unset` from one in-process axum server.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, Bloom, TxHash, B256};
use alloy::sol_types::SolEvent;
use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use marketplace_client::config::MarketplaceConfig;

pub const CONTRACT: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
pub const ALICE: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";
pub const CHAIN_ID: u64 = 31337;

pub fn alice() -> Address {
    ALICE.parse().unwrap()
}

pub fn tx_hash() -> TxHash {
    TxHash::repeat_byte(0x77)
}

/// Scriptable wallet and chain state.
#[derive(Debug)]
pub struct WalletState {
    pub accounts: Vec<Address>,
    pub chain_id: u64,
    /// Receipt status once mined.
    pub receipt_status: u64,
    /// Receipt queries answered with `null` before the receipt appears.
    pub pending_polls: u32,
    pub logs: Vec<Value>,
    /// JSON-RPC error returned for `eth_sendTransaction`.
    pub reject_send: Option<(i64, String)>,
    /// Every RPC method called, in order.
    pub calls: Vec<String>,
    pub sent: Vec<Value>,
    pub raw_sent: Vec<Value>,
    pub unset_calls: Vec<(String, Value)>,
}

impl Default for WalletState {
    fn default() -> Self {
        Self {
            accounts: vec![alice()],
            chain_id: CHAIN_ID,
            receipt_status: 1,
            pending_polls: 0,
            logs: Vec::new(),
            reject_send: None,
            calls: Vec::new(),
            sent: Vec::new(),
            raw_sent: Vec::new(),
            unset_calls: Vec::new(),
        }
    }
}

type Shared = Arc<Mutex<WalletState>>;

pub struct MockWallet {
    pub addr: SocketAddr,
    pub state: Shared,
}

impl MockWallet {
    /// Start the mock server on an ephemeral port.
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(WalletState::default()));
        let app = Router::new()
            .route("/", post(rpc))
            .route("/{resource}/unset", post(unset))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut WalletState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn calls_to(&self, method: &str) -> usize {
        self.with(|s| s.calls.iter().filter(|m| *m == method).count())
    }

    /// Client configuration pointing at this server.
    pub fn config(&self) -> MarketplaceConfig {
        let mut config = MarketplaceConfig::default();
        config.wallet.provider_url = Some(self.url());
        config.backend.base_url = Some(self.url());
        config.contract.address = CONTRACT.to_string();
        config.contract.receipt_poll_interval_ms = 10;
        config.network.required_chain_id = CHAIN_ID;
        config.network.required_chain_name = "Anvil".to_string();
        config
    }

    /// Wait until `count` rollback calls arrived, or give up after two seconds.
    pub async fn wait_for_unset(&self, count: usize) -> Vec<(String, Value)> {
        for _ in 0..200 {
            let calls = self.with(|s| s.unset_calls.clone());
            if calls.len() >= count {
                return calls;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.with(|s| s.unset_calls.clone())
    }
}

/// An `eth_getLogs` entry for `event`, emitted by the marketplace contract
/// in the mock transaction.
pub fn log_of<E: SolEvent>(event: &E) -> Value {
    let data = event.encode_log_data();
    json!({
        "address": CONTRACT,
        "topics": data.topics(),
        "data": data.data,
        "blockHash": block_hash(),
        "blockNumber": "0x20",
        "transactionHash": tx_hash(),
        "transactionIndex": "0x0",
        "logIndex": "0x0",
        "removed": false,
    })
}

fn block_hash() -> B256 {
    B256::repeat_byte(0xbb)
}

/// A legacy receipt for the mock transaction, mined in block `0x20`.
fn receipt(s: &WalletState) -> Value {
    json!({
        "type": "0x0",
        "status": format!("0x{:x}", s.receipt_status),
        "cumulativeGasUsed": "0x30d40",
        "logs": [],
        "logsBloom": Bloom::ZERO,
        "transactionHash": tx_hash(),
        "transactionIndex": "0x0",
        "blockHash": block_hash(),
        "blockNumber": "0x20",
        "gasUsed": "0x30d40",
        "effectiveGasPrice": "0x3b9aca00",
        "from": s.accounts.first().copied().unwrap_or_default(),
        "to": CONTRACT,
        "contractAddress": null,
    })
}

async fn rpc(State(state): State<Shared>, Json(request): Json<Value>) -> Json<Value> {
    let id = request["id"].clone();
    let method = request["method"].as_str().unwrap_or_default().to_string();
    let params = request["params"].clone();

    let outcome = {
        let mut s = state.lock().unwrap();
        s.calls.push(method.clone());
        answer(&mut s, &method, params)
    };

    Json(match outcome {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err((code, message)) => {
            json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code, "message": message } })
        }
    })
}

fn answer(s: &mut WalletState, method: &str, params: Value) -> Result<Value, (i64, String)> {
    match method {
        "eth_requestAccounts" | "eth_accounts" => Ok(json!(s.accounts)),
        "eth_chainId" => Ok(json!(format!("0x{:x}", s.chain_id))),
        "personal_sign" => Ok(json!(format!("0x{}", "11".repeat(65)))),
        "eth_getTransactionCount" => Ok(json!("0x1")),
        "eth_estimateGas" => Ok(json!("0x30d40")),
        "eth_gasPrice" => Ok(json!("0x3b9aca00")),
        "eth_getBalance" => Ok(json!("0xde0b6b3a7640000")),
        "eth_sendTransaction" => {
            s.sent.push(params[0].clone());
            match &s.reject_send {
                Some(error) => Err(error.clone()),
                None => Ok(json!(tx_hash())),
            }
        }
        "eth_sendRawTransaction" => {
            s.raw_sent.push(params[0].clone());
            Ok(json!(tx_hash()))
        }
        "eth_getTransactionReceipt" => {
            if s.pending_polls > 0 {
                s.pending_polls -= 1;
                return Ok(Value::Null);
            }
            Ok(receipt(s))
        }
        "eth_getLogs" => Ok(json!(s.logs)),
        "wallet_revokePermissions" => Ok(Value::Null),
        other => Err((-32601, format!("the method {} does not exist/is not available", other))),
    }
}

async fn unset(
    State(state): State<Shared>,
    Path(resource): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.lock().unwrap().unset_calls.push((resource, body));
    Json(json!({ "status": true }))
}
