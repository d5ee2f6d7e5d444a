#[path = "../src/tests/support.rs"]
mod support;

use std::path::PathBuf;

use dapp_core::{
    connect, notifications::NotificationKind, DappEvent, DappSettings, InputState,
    NotificationEvent, OperationOutcome, ViewModel,
};
use shared::domain::{EthAddress, NumericInput, Quantity};
use support::MockNode;
use tempfile::TempDir;

const ACCOUNT: &str = "0x00000000000000000000000000000000000000aa";

fn write_artifact() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("artifact dir");
    let path = dir.path().join("SimpleStorage.json");
    std::fs::write(&path, r#"{"contractName":"SimpleStorage","bytecode":"0x6080604052"}"#)
        .expect("artifact");
    (dir, path)
}

fn settings_for(node: &MockNode, artifact: PathBuf) -> DappSettings {
    DappSettings {
        web3_provider_url: node.url.clone(),
        wallet_url: Some(node.url.clone()),
        contract_artifact: artifact,
        receipt_poll_interval_ms: 10,
        receipt_timeout_secs: 5,
        ..DappSettings::default()
    }
}

#[tokio::test]
async fn bootstrap_deploy_read_and_write_against_node() {
    let node = MockNode::spawn()
        .await
        .expect("spawn node")
        .with_account(ACCOUNT, "0x49504f80")
        .await;
    node.delay_receipts(2).await;
    let (_dir, artifact) = write_artifact();
    let settings = settings_for(&node, artifact);

    let mut controller = connect(&settings).await.expect("connect");
    let mut events = controller.subscribe_events();

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.account, Some(EthAddress::from(ACCOUNT)));
    assert_eq!(snapshot.balance, Some(Quantity::from(1_230_000_000)));
    assert!(snapshot.short_address.is_some());

    assert_eq!(controller.deploy_contract().await, OperationOutcome::Succeeded);
    let contract = controller.snapshot().contract.expect("contract recorded");
    assert!(contract.deploy_tx_hash.is_some());

    assert!(controller.get_stored_value().await.succeeded());
    assert_eq!(controller.snapshot().stored_value, Some(Quantity::from(123)));

    assert!(controller
        .set_new_stored_value(NumericInput::parse("456"))
        .await
        .succeeded());
    assert_eq!(node.stored_value(contract.address.as_str()).await, Some(456));

    assert!(controller.get_stored_value().await.succeeded());
    assert_eq!(controller.snapshot().stored_value, Some(Quantity::from(456)));

    let mut successes = 0;
    while let Ok(event) = events.try_recv() {
        if let DappEvent::Notification(NotificationEvent::Shown(n)) = event {
            assert_ne!(n.kind, NotificationKind::Failure, "{}", n.message);
            if n.kind == NotificationKind::Success {
                successes += 1;
            }
        }
    }
    assert_eq!(successes, 4);
}

#[tokio::test]
async fn nan_write_is_refused_before_reaching_the_node() {
    let node = MockNode::spawn()
        .await
        .expect("spawn node")
        .with_account(ACCOUNT, "0x1")
        .await;
    node.seed_contract("0x00000000000000000000000000000000c0de0001", 9)
        .await;
    let (_dir, artifact) = write_artifact();
    let settings = settings_for(&node, artifact);

    let mut controller = connect(&settings).await.expect("connect");
    assert!(controller
        .set_existing_contract_address(" 0x00000000000000000000000000000000c0de0001 ")
        .succeeded());

    let outcome = controller
        .set_new_stored_value(NumericInput::parse("12a"))
        .await;
    assert_eq!(outcome, OperationOutcome::Failed);
    assert!(node.calls_to("eth_sendTransaction").await.is_empty());
    assert!(!controller.snapshot().transaction_in_progress);
    assert_eq!(
        node.stored_value("0x00000000000000000000000000000000c0de0001")
            .await,
        Some(9)
    );
}

#[tokio::test]
async fn denied_wallet_access_leaves_a_degraded_session() {
    let node = MockNode::spawn()
        .await
        .expect("spawn node")
        .with_account(ACCOUNT, "0x1")
        .await;
    node.deny_access().await;
    let (_dir, artifact) = write_artifact();
    let settings = settings_for(&node, artifact);

    let mut controller = connect(&settings).await.expect("denial is not fatal");
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.account, None);
    assert_eq!(snapshot.balance, None);
    assert!(node.calls_to("eth_getBalance").await.is_empty());

    assert_eq!(controller.deploy_contract().await, OperationOutcome::Failed);
}

#[tokio::test]
async fn balance_failure_keeps_account_and_short_address() {
    let node = MockNode::spawn()
        .await
        .expect("spawn node")
        .with_account(ACCOUNT, "0x1")
        .await;
    node.fail_method("eth_getBalance", -32603, "node is syncing")
        .await;
    let (_dir, artifact) = write_artifact();
    let settings = settings_for(&node, artifact);

    let controller = connect(&settings).await.expect("balance failure is not fatal");
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.account, Some(EthAddress::from(ACCOUNT)));
    assert!(snapshot.short_address.is_some());
    assert_eq!(snapshot.balance, None);

    let view = ViewModel::build(&snapshot, &InputState::default());
    assert_eq!(view.eth_address, ACCOUNT);
    assert!(!view.deploy_enabled);
}

#[tokio::test]
async fn missing_wallet_fails_connect() {
    let node = MockNode::spawn().await.expect("spawn node");
    let (_dir, artifact) = write_artifact();
    let settings = DappSettings {
        wallet_url: None,
        ..settings_for(&node, artifact)
    };
    let err = connect(&settings).await.err().expect("no wallet");
    assert!(err.to_string().contains("no wallet provider"));
}
