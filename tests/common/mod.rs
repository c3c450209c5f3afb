//! Shared utilities for integration testing.

#![allow(dead_code)]

use alloy::hex;
use alloy::primitives::keccak256;
use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_WALLET: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
pub const RECIPIENT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

struct NodeState {
    chain_id: u64,
    head: AtomicU64,
    balance_wei: u128,
    gas_price_wei: u128,
    methods: Mutex<Vec<String>>,
    raw_txs: Mutex<Vec<Vec<u8>>>,
    /// tx hash → block it was mined in
    mined: Mutex<Vec<(String, u64)>>,
}

/// A JSON-RPC node on an ephemeral port. Raw transactions are mined
/// immediately, one block above the current head.
pub struct MockNode {
    addr: SocketAddr,
    state: Arc<NodeState>,
}

impl MockNode {
    pub async fn start(chain_id: u64, head: u64) -> Self {
        Self::start_with_balance(chain_id, head, 0).await
    }

    pub async fn start_with_balance(chain_id: u64, head: u64, balance_wei: u128) -> Self {
        let state = Arc::new(NodeState {
            chain_id,
            head: AtomicU64::new(head),
            balance_wei,
            gas_price_wei: 20_000_000_000,
            methods: Mutex::new(Vec::new()),
            raw_txs: Mutex::new(Vec::new()),
            mined: Mutex::new(Vec::new()),
        });

        let app = Router::new().route("/", post(handle_rpc)).with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// JSON-RPC methods received, in order.
    pub fn methods(&self) -> Vec<String> {
        self.state.methods.lock().unwrap().clone()
    }

    /// Raw transaction payloads received.
    pub fn raw_transactions(&self) -> Vec<Vec<u8>> {
        self.state.raw_txs.lock().unwrap().clone()
    }
}

async fn handle_rpc(State(state): State<Arc<NodeState>>, Json(request): Json<Value>) -> Json<Value> {
    let id = request["id"].clone();
    let method = request["method"].as_str().unwrap_or_default().to_string();
    state.methods.lock().unwrap().push(method.clone());

    let result = match method.as_str() {
        "eth_chainId" => json!(format!("0x{:x}", state.chain_id)),
        "eth_blockNumber" => json!(format!("0x{:x}", state.head.load(Ordering::SeqCst))),
        "eth_getBalance" => json!(format!("0x{:x}", state.balance_wei)),
        "eth_getTransactionCount" => json!("0x0"),
        "eth_gasPrice" => json!(format!("0x{:x}", state.gas_price_wei)),
        "eth_sendRawTransaction" => {
            let raw_hex = request["params"][0].as_str().unwrap_or_default();
            let raw = hex::decode(raw_hex).unwrap_or_default();
            let hash = hex::encode_prefixed(keccak256(&raw));
            let block = state.head.fetch_add(1, Ordering::SeqCst) + 1;
            state.raw_txs.lock().unwrap().push(raw);
            state.mined.lock().unwrap().push((hash.clone(), block));
            json!(hash)
        }
        "eth_getTransactionReceipt" => {
            let wanted = request["params"][0].as_str().unwrap_or_default().to_lowercase();
            let mined = state.mined.lock().unwrap().clone();
            match mined.into_iter().find(|(hash, _)| *hash == wanted) {
                Some((hash, block)) => receipt_json(&hash, block),
                None => Value::Null,
            }
        }
        _ => {
            return Json(json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": -32601, "message": "method not found" }
            }))
        }
    };

    Json(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
}

fn receipt_json(hash: &str, block: u64) -> Value {
    json!({
        "type": "0x0",
        "status": "0x1",
        "cumulativeGasUsed": "0x5208",
        "logs": [],
        "logsBloom": format!("0x{}", "00".repeat(256)),
        "transactionHash": hash,
        "transactionIndex": "0x0",
        "blockHash": format!("0x{}", "11".repeat(32)),
        "blockNumber": format!("0x{:x}", block),
        "gasUsed": "0x5208",
        "effectiveGasPrice": "0x4a817c800",
        "from": TEST_WALLET.to_lowercase(),
        "to": RECIPIENT.to_lowercase(),
        "contractAddress": null
    })
}

/// URL of a local port nothing listens on.
pub async fn dead_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
