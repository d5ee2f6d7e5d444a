use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use shared::{
    domain::{EthAddress, Quantity},
    error::RpcException,
    protocol::{JsonRpcRequest, JsonRpcResponse},
};

use crate::config::RollupConfig;

/// Rollup-aware JSON-RPC handle shared by every chain interaction.
#[async_trait]
pub trait RollupTransport: Send + Sync {
    fn rollup_config(&self) -> &RollupConfig;

    async fn request(&self, method: &str, params: Value) -> Result<Value>;

    async fn get_balance(&self, address: &EthAddress) -> Result<Quantity> {
        let raw = self
            .request("eth_getBalance", json!([address, "latest"]))
            .await?;
        let text = raw
            .as_str()
            .ok_or_else(|| anyhow!("eth_getBalance returned a non-string result: {raw}"))?;
        Quantity::from_hex_str(text).context("eth_getBalance returned an invalid quantity")
    }
}

pub struct JsonRpcTransport {
    http: Client,
    rpc_url: String,
    config: RollupConfig,
    next_id: AtomicU64,
}

impl JsonRpcTransport {
    pub fn new(rpc_url: impl Into<String>, config: RollupConfig) -> Self {
        Self {
            http: Client::new(),
            rpc_url: rpc_url.into(),
            config,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn from_config(config: &RollupConfig) -> Self {
        Self::new(config.rpc_url.clone(), config.clone())
    }
}

#[async_trait]
impl RollupTransport for JsonRpcTransport {
    fn rollup_config(&self) -> &RollupConfig {
        &self.config
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        post_json_rpc(&self.http, &self.rpc_url, id, method, params).await
    }
}

pub(crate) async fn post_json_rpc(
    http: &Client,
    url: &str,
    id: u64,
    method: &str,
    params: Value,
) -> Result<Value> {
    tracing::debug!(method, id, url, "json-rpc request");
    let response = http
        .post(url)
        .json(&JsonRpcRequest::new(id, method, params))
        .send()
        .await
        .with_context(|| format!("failed to reach json-rpc endpoint {url} for {method}"))?
        .error_for_status()
        .with_context(|| format!("json-rpc endpoint {url} rejected {method}"))?;

    let body: JsonRpcResponse = response
        .json()
        .await
        .with_context(|| format!("invalid json-rpc response payload for {method}"))?;

    if let Some(error) = body.error {
        return Err(RpcException::new(method, error).into());
    }
    Ok(body.result.unwrap_or(Value::Null))
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
