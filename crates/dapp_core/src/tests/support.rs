#![allow(dead_code)]

//! In-process JSON-RPC node for tests: accounts, balances, and a single
//! SimpleStorage contract type whose initial stored value is 123.

use std::{collections::HashMap, sync::Arc};

use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};
use shared::{
    error::RpcErrorObject,
    protocol::{JsonRpcRequest, JsonRpcResponse},
};
use tokio::{net::TcpListener, sync::Mutex};

pub const GET_SELECTOR: &str = "0x6d4ce63c";
pub const SET_SELECTOR: &str = "0x60fe47b1";
pub const INITIAL_STORED_VALUE: u64 = 123;

#[derive(Default)]
pub struct MockChain {
    pub accounts: Vec<String>,
    pub deny_access: bool,
    pub balances: HashMap<String, String>,
    pub stored: HashMap<String, u64>,
    pub receipts: HashMap<String, Value>,
    pub failing_methods: HashMap<String, RpcErrorObject>,
    pub null_receipt_polls: u32,
    pub calls: Vec<(String, Value)>,
    next_contract: u64,
    next_tx: u64,
}

#[derive(Clone, Default)]
pub struct MockNodeState {
    pub chain: Arc<Mutex<MockChain>>,
}

pub struct MockNode {
    pub url: String,
    pub state: MockNodeState,
}

impl MockNode {
    pub async fn spawn() -> anyhow::Result<Self> {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = MockNodeState::default();
        let app = Router::new()
            .route("/", post(handle_rpc))
            .with_state(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(Self {
            url: format!("http://{addr}"),
            state,
        })
    }

    pub async fn with_account(self, account: &str, balance_hex: &str) -> Self {
        {
            let mut chain = self.state.chain.lock().await;
            chain.accounts = vec![account.to_string()];
            chain
                .balances
                .insert(account.to_ascii_lowercase(), balance_hex.to_string());
        }
        self
    }

    pub async fn fail_method(&self, method: &str, code: i64, message: &str) {
        self.state
            .chain
            .lock()
            .await
            .failing_methods
            .insert(method.to_string(), RpcErrorObject::new(code, message));
    }

    pub async fn deny_access(&self) {
        self.state.chain.lock().await.deny_access = true;
    }

    pub async fn delay_receipts(&self, polls: u32) {
        self.state.chain.lock().await.null_receipt_polls = polls;
    }

    pub async fn stored_value(&self, contract: &str) -> Option<u64> {
        self.state
            .chain
            .lock()
            .await
            .stored
            .get(&contract.to_ascii_lowercase())
            .copied()
    }

    pub async fn seed_contract(&self, contract: &str, value: u64) {
        self.state
            .chain
            .lock()
            .await
            .stored
            .insert(contract.to_ascii_lowercase(), value);
    }

    pub async fn calls_to(&self, method: &str) -> Vec<Value> {
        self.state
            .chain
            .lock()
            .await
            .calls
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
            .collect()
    }
}

async fn handle_rpc(
    State(state): State<MockNodeState>,
    Json(request): Json<JsonRpcRequest>,
) -> Json<JsonRpcResponse> {
    let id = json!(request.id);
    let mut chain = state.chain.lock().await;
    chain
        .calls
        .push((request.method.clone(), request.params.clone()));

    if let Some(error) = chain.failing_methods.get(&request.method) {
        return Json(JsonRpcResponse::failure(id, error.clone()));
    }

    let result = match request.method.as_str() {
        "eth_requestAccounts" => {
            if chain.deny_access {
                return Json(JsonRpcResponse::failure(
                    id,
                    RpcErrorObject::new(4001, "User rejected the request."),
                ));
            }
            json!(chain.accounts)
        }
        "eth_accounts" => {
            if chain.deny_access {
                json!([])
            } else {
                json!(chain.accounts)
            }
        }
        "eth_getBalance" => {
            let address = param_str(&request.params, 0).to_ascii_lowercase();
            json!(chain
                .balances
                .get(&address)
                .cloned()
                .unwrap_or_else(|| "0x0".to_string()))
        }
        "eth_sendTransaction" => {
            let tx = request.params.get(0).cloned().unwrap_or(Value::Null);
            chain.next_tx += 1;
            let tx_hash = format!("0x{:064x}", chain.next_tx);
            let contract_address = match tx.get("to").and_then(Value::as_str) {
                None => {
                    chain.next_contract += 1;
                    let address = format!("0x{:040x}", 0xc0de_0000u64 + chain.next_contract);
                    chain.stored.insert(address.clone(), INITIAL_STORED_VALUE);
                    Some(address)
                }
                Some(to) => {
                    let data = tx.get("data").and_then(Value::as_str).unwrap_or_default();
                    if let Some(word) = data.strip_prefix(SET_SELECTOR) {
                        let value = u64::from_str_radix(word.trim_start_matches('0'), 16)
                            .unwrap_or(0);
                        chain.stored.insert(to.to_ascii_lowercase(), value);
                    }
                    None
                }
            };
            let receipt = json!({
                "transactionHash": tx_hash,
                "contractAddress": contract_address,
                "status": "0x1",
            });
            chain.receipts.insert(tx_hash.clone(), receipt);
            json!(tx_hash)
        }
        "eth_getTransactionReceipt" => {
            if chain.null_receipt_polls > 0 {
                chain.null_receipt_polls -= 1;
                Value::Null
            } else {
                let hash = param_str(&request.params, 0);
                chain.receipts.get(&hash).cloned().unwrap_or(Value::Null)
            }
        }
        "eth_call" => {
            let call = request.params.get(0).cloned().unwrap_or(Value::Null);
            let to = call
                .get("to")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_ascii_lowercase();
            let data = call.get("data").and_then(Value::as_str).unwrap_or_default();
            match chain.stored.get(&to) {
                Some(value) if data == GET_SELECTOR => json!(format!("0x{value:064x}")),
                _ => json!("0x"),
            }
        }
        other => {
            return Json(JsonRpcResponse::failure(
                id,
                RpcErrorObject::new(-32601, format!("method {other} not found")),
            ));
        }
    };
    Json(JsonRpcResponse::success(id, result))
}

fn param_str(params: &Value, index: usize) -> String {
    params
        .get(index)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
