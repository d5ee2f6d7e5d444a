use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use shared::{
    domain::{ContractAddress, EthAddress, NumericInput, Quantity, TxHash},
    protocol::{TransactionReceipt, TransactionRequest},
};

use crate::{config::ReceiptWait, transport::RollupTransport};

/// `get()`
pub const GET_SELECTOR: &str = "0x6d4ce63c";
/// `set(uint256)`
pub const SET_SELECTOR: &str = "0x60fe47b1";
pub const DEFAULT_GAS_LIMIT: u64 = 6_000_000;

/// Wrapper around one SimpleStorage contract instance.
#[async_trait]
pub trait SimpleStorage: Send + Sync {
    /// Deploys a fresh instance and binds this wrapper to it.
    async fn deploy(&mut self, from: &EthAddress) -> Result<TxHash>;
    /// Binds this wrapper to an already deployed instance.
    fn use_deployed(&mut self, address: ContractAddress);
    async fn get_stored_value(&self, from: &EthAddress) -> Result<Quantity>;
    async fn set_stored_value(&self, value: NumericInput, from: &EthAddress) -> Result<()>;
    fn address(&self) -> Option<&ContractAddress>;
}

/// Builds wrappers bound to a transport.
pub trait ContractFactory: Send + Sync {
    fn create(&self, transport: Arc<dyn RollupTransport>) -> Box<dyn SimpleStorage>;
}

/// Truffle/solc build artifact; only the creation bytecode is used.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractArtifact {
    pub bytecode: String,
}

impl ContractArtifact {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read contract artifact '{}'", path.display()))?;
        let artifact: Self = serde_json::from_str(&raw)
            .with_context(|| format!("invalid contract artifact '{}'", path.display()))?;
        let digits = artifact.bytecode.trim_start_matches("0x");
        if digits.is_empty() {
            bail!("contract artifact '{}' has empty bytecode", path.display());
        }
        Ok(artifact)
    }

    fn creation_data(&self) -> String {
        if self.bytecode.starts_with("0x") {
            self.bytecode.clone()
        } else {
            format!("0x{}", self.bytecode)
        }
    }
}

pub fn encode_set_call(value: NumericInput) -> Result<String> {
    match value {
        NumericInput::Number(n) if n >= 0 => Ok(format!("{SET_SELECTOR}{:064x}", n as u64)),
        NumericInput::Number(n) => bail!("cannot encode negative value {n} as uint256"),
        NumericInput::NotANumber => bail!("cannot encode NaN as uint256"),
        NumericInput::Unset => bail!("no value supplied for set(uint256)"),
    }
}

pub struct RpcSimpleStorage {
    transport: Arc<dyn RollupTransport>,
    artifact_path: PathBuf,
    receipt_wait: ReceiptWait,
    address: Option<ContractAddress>,
}

impl RpcSimpleStorage {
    pub fn new(
        transport: Arc<dyn RollupTransport>,
        artifact_path: PathBuf,
        receipt_wait: ReceiptWait,
    ) -> Self {
        Self {
            transport,
            artifact_path,
            receipt_wait,
            address: None,
        }
    }

    fn require_address(&self) -> Result<&ContractAddress> {
        self.address
            .as_ref()
            .ok_or_else(|| anyhow!("contract wrapper is not bound to an address"))
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<TxHash> {
        let raw = self
            .transport
            .request("eth_sendTransaction", json!([request]))
            .await?;
        let hash = raw
            .as_str()
            .ok_or_else(|| anyhow!("eth_sendTransaction returned a non-string result: {raw}"))?;
        Ok(TxHash::from(hash))
    }
}

#[async_trait]
impl SimpleStorage for RpcSimpleStorage {
    async fn deploy(&mut self, from: &EthAddress) -> Result<TxHash> {
        let artifact = ContractArtifact::load(&self.artifact_path)?;
        let tx_hash = self
            .send_transaction(TransactionRequest {
                from: from.clone(),
                to: None,
                data: artifact.creation_data(),
                gas: Some(format!("0x{DEFAULT_GAS_LIMIT:x}")),
            })
            .await?;
        tracing::info!(tx_hash = %tx_hash, "deploy transaction submitted");

        let receipt = wait_for_receipt(self.transport.as_ref(), &tx_hash, self.receipt_wait).await?;
        let address = receipt
            .contract_address
            .ok_or_else(|| anyhow!("deploy receipt for {tx_hash} has no contract address"))?;
        self.address = Some(address);
        Ok(tx_hash)
    }

    fn use_deployed(&mut self, address: ContractAddress) {
        self.address = Some(address);
    }

    async fn get_stored_value(&self, from: &EthAddress) -> Result<Quantity> {
        let call = TransactionRequest {
            from: from.clone(),
            to: Some(self.require_address()?.clone()),
            data: GET_SELECTOR.to_string(),
            gas: None,
        };
        let raw = self
            .transport
            .request("eth_call", json!([call, "latest"]))
            .await?;
        let word = raw
            .as_str()
            .ok_or_else(|| anyhow!("eth_call returned a non-string result: {raw}"))?;
        Quantity::from_hex_str(word).context("get() returned an undecodable value")
    }

    async fn set_stored_value(&self, value: NumericInput, from: &EthAddress) -> Result<()> {
        let to = self.require_address()?.clone();
        let data = encode_set_call(value)?;
        let tx_hash = self
            .send_transaction(TransactionRequest {
                from: from.clone(),
                to: Some(to),
                data,
                gas: Some(format!("0x{DEFAULT_GAS_LIMIT:x}")),
            })
            .await?;
        wait_for_receipt(self.transport.as_ref(), &tx_hash, self.receipt_wait).await?;
        Ok(())
    }

    fn address(&self) -> Option<&ContractAddress> {
        self.address.as_ref()
    }
}

/// Polls `eth_getTransactionReceipt` until the receipt exists or the wait times out.
pub async fn wait_for_receipt(
    transport: &dyn RollupTransport,
    tx_hash: &TxHash,
    wait: ReceiptWait,
) -> Result<TransactionReceipt> {
    let started = Instant::now();
    loop {
        let raw = transport
            .request("eth_getTransactionReceipt", json!([tx_hash]))
            .await?;
        if raw != Value::Null {
            let receipt: TransactionReceipt =
                serde_json::from_value(raw).context("invalid transaction receipt")?;
            if !receipt.succeeded() {
                bail!("transaction {tx_hash} reverted");
            }
            return Ok(receipt);
        }
        if started.elapsed() >= wait.timeout {
            bail!(
                "timed out after {:?} waiting for receipt of {tx_hash}",
                wait.timeout
            );
        }
        tokio::time::sleep(wait.poll_interval).await;
    }
}

pub struct RpcSimpleStorageFactory {
    artifact_path: PathBuf,
    receipt_wait: ReceiptWait,
}

impl RpcSimpleStorageFactory {
    pub fn new(artifact_path: impl Into<PathBuf>, receipt_wait: ReceiptWait) -> Self {
        Self {
            artifact_path: artifact_path.into(),
            receipt_wait,
        }
    }
}

impl ContractFactory for RpcSimpleStorageFactory {
    fn create(&self, transport: Arc<dyn RollupTransport>) -> Box<dyn SimpleStorage> {
        Box::new(RpcSimpleStorage::new(
            transport,
            self.artifact_path.clone(),
            self.receipt_wait,
        ))
    }
}

#[cfg(test)]
#[path = "tests/contract_tests.rs"]
mod tests;
