use super::*;
use crate::{config::RollupConfig, test_support::MockNode, transport::JsonRpcTransport};

use std::{fs, time::Duration};

use tempfile::TempDir;

const ACCOUNT: &str = "0x00000000000000000000000000000000000000aa";

fn fast_wait() -> ReceiptWait {
    ReceiptWait {
        poll_interval: Duration::from_millis(5),
        timeout: Duration::from_secs(5),
    }
}

fn write_artifact(bytecode: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("artifact dir");
    let path = dir.path().join("SimpleStorage.json");
    fs::write(
        &path,
        serde_json::to_string(&json!({ "contractName": "SimpleStorage", "bytecode": bytecode }))
            .expect("artifact json"),
    )
    .expect("write artifact");
    (dir, path)
}

fn transport_for(node: &MockNode) -> Arc<dyn RollupTransport> {
    Arc::new(JsonRpcTransport::from_config(&RollupConfig {
        rpc_url: node.url.clone(),
        rollup_type_hash: format!("0x{}", "11".repeat(32)),
        eth_account_lock_code_hash: format!("0x{}", "22".repeat(32)),
        web3_url: node.url.clone(),
    }))
}

#[test]
fn encodes_set_call_as_selector_and_word() {
    assert_eq!(
        encode_set_call(NumericInput::Number(123)).expect("encode"),
        format!("0x60fe47b1{}7b", "0".repeat(62))
    );
    assert!(encode_set_call(NumericInput::Number(-1)).is_err());
    let nan = encode_set_call(NumericInput::NotANumber).expect_err("nan");
    assert!(nan.to_string().contains("NaN"));
    assert!(encode_set_call(NumericInput::Unset).is_err());
}

#[tokio::test]
async fn deploy_sends_artifact_bytecode_and_binds_receipt_address() {
    let node = MockNode::spawn().await.expect("spawn node");
    node.delay_receipts(2).await;
    let (_dir, artifact) = write_artifact("0x6080604052");
    let factory = RpcSimpleStorageFactory::new(&artifact, fast_wait());
    let mut contract = factory.create(transport_for(&node));

    let tx_hash = contract
        .deploy(&EthAddress::from(ACCOUNT))
        .await
        .expect("deploy");
    let address = contract.address().cloned().expect("bound address");

    let sent = node.calls_to("eth_sendTransaction").await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0][0]["data"], json!("0x6080604052"));
    assert_eq!(sent[0][0]["gas"], json!("0x5b8d80"));
    assert!(sent[0][0].get("to").is_none());
    assert_eq!(node.calls_to("eth_getTransactionReceipt").await.len(), 3);
    assert!(tx_hash.as_str().starts_with("0x"));
    assert_eq!(node.stored_value(address.as_str()).await, Some(123));
}

#[tokio::test]
async fn deploy_fails_without_artifact_and_leaves_wrapper_unbound() {
    let node = MockNode::spawn().await.expect("spawn node");
    let dir = tempfile::tempdir().expect("temp dir");
    let factory =
        RpcSimpleStorageFactory::new(dir.path().join("SimpleStorage.json"), fast_wait());
    let mut contract = factory.create(transport_for(&node));

    let err = contract
        .deploy(&EthAddress::from(ACCOUNT))
        .await
        .expect_err("missing artifact");
    assert!(err.to_string().contains("failed to read contract artifact"));
    assert!(contract.address().is_none());
    assert!(node.calls_to("eth_sendTransaction").await.is_empty());
}

#[tokio::test]
async fn reads_and_writes_stored_value_of_attached_contract() {
    let node = MockNode::spawn().await.expect("spawn node");
    let contract_address = "0x00000000000000000000000000000000c0ffee01";
    node.seed_contract(contract_address, 7).await;
    let factory = RpcSimpleStorageFactory::new("unused.json", fast_wait());
    let mut contract = factory.create(transport_for(&node));
    contract.use_deployed(ContractAddress::from(contract_address));

    let from = EthAddress::from(ACCOUNT);
    assert_eq!(
        contract.get_stored_value(&from).await.expect("get"),
        Quantity::from(7)
    );

    contract
        .set_stored_value(NumericInput::Number(42), &from)
        .await
        .expect("set");
    assert_eq!(node.stored_value(contract_address).await, Some(42));
    assert_eq!(
        contract.get_stored_value(&from).await.expect("get"),
        Quantity::from(42)
    );
}

#[tokio::test]
async fn nan_write_is_rejected_before_reaching_the_node() {
    let node = MockNode::spawn().await.expect("spawn node");
    let factory = RpcSimpleStorageFactory::new("unused.json", fast_wait());
    let mut contract = factory.create(transport_for(&node));
    contract.use_deployed(ContractAddress::from("0x01"));

    let err = contract
        .set_stored_value(NumericInput::NotANumber, &EthAddress::from(ACCOUNT))
        .await
        .expect_err("nan");
    assert!(err.to_string().contains("NaN"));
    assert!(node.calls_to("eth_sendTransaction").await.is_empty());
}

#[tokio::test]
async fn reading_from_an_address_without_code_fails() {
    let node = MockNode::spawn().await.expect("spawn node");
    let factory = RpcSimpleStorageFactory::new("unused.json", fast_wait());
    let mut contract = factory.create(transport_for(&node));
    contract.use_deployed(ContractAddress::from("0xABC"));

    let err = contract
        .get_stored_value(&EthAddress::from(ACCOUNT))
        .await
        .expect_err("no code");
    assert!(err.to_string().contains("undecodable"));
}

#[tokio::test]
async fn unbound_wrapper_refuses_reads() {
    let node = MockNode::spawn().await.expect("spawn node");
    let factory = RpcSimpleStorageFactory::new("unused.json", fast_wait());
    let contract = factory.create(transport_for(&node));
    assert!(contract
        .get_stored_value(&EthAddress::from(ACCOUNT))
        .await
        .is_err());
}

#[tokio::test]
async fn receipt_wait_times_out() {
    let node = MockNode::spawn().await.expect("spawn node");
    let transport = transport_for(&node);
    let err = wait_for_receipt(
        transport.as_ref(),
        &TxHash::from("0xmissing"),
        ReceiptWait {
            poll_interval: Duration::from_millis(5),
            timeout: Duration::from_millis(30),
        },
    )
    .await
    .expect_err("timeout");
    assert!(err.to_string().contains("timed out"));
}
