use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use shared::{domain::EthAddress, error::RpcException};

use crate::transport::post_json_rpc;

/// Account access exposed by the user's wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Asks the user to grant account access.
    async fn enable(&self) -> Result<Vec<EthAddress>>;
    async fn selected_address(&self) -> Result<Option<EthAddress>>;
}

/// Wallet capability resolved once at startup.
#[derive(Clone)]
pub enum WalletBridge {
    Available(Arc<dyn WalletProvider>),
    NotAvailable,
}

impl WalletBridge {
    pub fn detect(wallet_url: Option<&str>) -> Self {
        match wallet_url {
            Some(url) => Self::Available(Arc::new(JsonRpcWallet::new(url))),
            None => Self::NotAvailable,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

pub fn is_access_denied(err: &anyhow::Error) -> bool {
    err.downcast_ref::<RpcException>()
        .is_some_and(RpcException::is_user_rejection)
}

/// Wallet reached over EIP-1193 style JSON-RPC (`eth_requestAccounts`).
pub struct JsonRpcWallet {
    http: Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcWallet {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    async fn accounts(&self, method: &str) -> Result<Vec<EthAddress>> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let raw = post_json_rpc(&self.http, &self.url, id, method, json!([])).await?;
        parse_accounts(method, raw)
    }
}

#[async_trait]
impl WalletProvider for JsonRpcWallet {
    async fn enable(&self) -> Result<Vec<EthAddress>> {
        self.accounts("eth_requestAccounts").await
    }

    async fn selected_address(&self) -> Result<Option<EthAddress>> {
        Ok(self.accounts("eth_accounts").await?.into_iter().next())
    }
}

fn parse_accounts(method: &str, raw: Value) -> Result<Vec<EthAddress>> {
    match raw {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => Ok(serde_json::from_value(raw)?),
        other => Err(anyhow!("{method} returned a non-array result: {other}")),
    }
}
