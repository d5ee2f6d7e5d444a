//! Runs user actions against the contract session and turns their outcome
//! into notifications. Failures are logged and reported, never returned.

use std::sync::Arc;

use shared::domain::NumericInput;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

use crate::{
    contract::ContractFactory,
    events::{DappEvent, DappSnapshot},
    notifications::{NotificationCenter, NotificationKind, PendingOperation},
    session::{ContractSession, Session},
};

pub const DEPLOY_SUCCESS_MESSAGE: &str = "Successfully deployed a smart-contract. You can now proceed to get or set the value in a smart contract.";
pub const READ_SUCCESS_MESSAGE: &str = "Successfully read latest stored value.";
pub const WRITE_SUCCESS_MESSAGE: &str =
    "Successfully set latest stored value. You can refresh the read value now manually.";
pub const TRANSACTION_FAILURE_MESSAGE: &str =
    "There was an error sending your transaction. Please check developer console.";
pub const READ_FAILURE_MESSAGE: &str =
    "There was an error reading the stored value. Please check developer console.";
pub const ATTACH_FAILURE_MESSAGE: &str = "Enter a contract address before attaching.";

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationOutcome {
    Succeeded,
    Failed,
}

impl OperationOutcome {
    pub fn succeeded(self) -> bool {
        self == Self::Succeeded
    }
}

pub struct DappController {
    session: Session,
    contracts: ContractSession,
    pending: PendingOperation,
    notifications: NotificationCenter,
    events: broadcast::Sender<DappEvent>,
}

impl DappController {
    pub fn new(session: Session, factory: Arc<dyn ContractFactory>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            session,
            contracts: ContractSession::new(factory),
            pending: PendingOperation::default(),
            notifications: NotificationCenter::new(events.clone()),
            events,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DappEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> DappSnapshot {
        DappSnapshot {
            account: self.session.account().cloned(),
            short_address: self.session.short_address().cloned(),
            balance: self.session.balance().cloned(),
            contract: self.contracts.contract_ref().cloned(),
            stored_value: self.contracts.stored_value().cloned(),
            transaction_in_progress: self.pending.is_in_progress(),
        }
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub async fn deploy_contract(&mut self) -> OperationOutcome {
        self.set_pending(true);
        let outcome = match self.contracts.deploy_contract(&self.session).await {
            Ok(contract_ref) => {
                info!(
                    address = %contract_ref.address,
                    tx_hash = ?contract_ref.deploy_tx_hash,
                    "deployed SimpleStorage contract"
                );
                self.notifications
                    .show(NotificationKind::Success, DEPLOY_SUCCESS_MESSAGE);
                OperationOutcome::Succeeded
            }
            Err(err) => {
                error!(error = %err, "contract deployment failed");
                self.notifications
                    .show(NotificationKind::Failure, TRANSACTION_FAILURE_MESSAGE);
                OperationOutcome::Failed
            }
        };
        self.set_pending(false);
        outcome
    }

    pub fn set_existing_contract_address(&mut self, address: &str) -> OperationOutcome {
        let outcome = match self
            .contracts
            .set_existing_contract_address(&self.session, address)
        {
            Ok(contract_ref) => {
                info!(address = %contract_ref.address, "attached to existing contract");
                OperationOutcome::Succeeded
            }
            Err(err) => {
                error!(error = %err, "failed to attach to existing contract");
                self.notifications
                    .show(NotificationKind::Failure, ATTACH_FAILURE_MESSAGE);
                OperationOutcome::Failed
            }
        };
        self.publish_state();
        outcome
    }

    pub async fn get_stored_value(&mut self) -> OperationOutcome {
        let outcome = match self.contracts.read_stored_value(&self.session).await {
            Ok(value) => {
                info!(%value, "read stored value");
                self.notifications
                    .show(NotificationKind::Success, READ_SUCCESS_MESSAGE);
                OperationOutcome::Succeeded
            }
            Err(err) => {
                error!(error = %err, "reading stored value failed");
                self.notifications
                    .show(NotificationKind::Failure, READ_FAILURE_MESSAGE);
                OperationOutcome::Failed
            }
        };
        self.publish_state();
        outcome
    }

    pub async fn set_new_stored_value(&mut self, value: NumericInput) -> OperationOutcome {
        debug!(%value, "submitting new stored value");
        self.set_pending(true);
        let outcome = match self
            .contracts
            .write_stored_value(&self.session, value)
            .await
        {
            Ok(()) => {
                info!(%value, "stored value updated");
                self.notifications
                    .show(NotificationKind::Success, WRITE_SUCCESS_MESSAGE);
                OperationOutcome::Succeeded
            }
            Err(err) => {
                error!(error = %err, "setting stored value failed");
                self.notifications
                    .show(NotificationKind::Failure, TRANSACTION_FAILURE_MESSAGE);
                OperationOutcome::Failed
            }
        };
        self.set_pending(false);
        outcome
    }

    pub async fn refresh_balance(&mut self) -> OperationOutcome {
        let outcome = match self.session.refresh_balance().await {
            Ok(()) => OperationOutcome::Succeeded,
            Err(err) => {
                error!(error = %err, "balance refresh failed");
                OperationOutcome::Failed
            }
        };
        self.publish_state();
        outcome
    }

    fn set_pending(&mut self, in_progress: bool) {
        self.pending.set(in_progress, &mut self.notifications);
        self.publish_state();
    }

    fn publish_state(&self) {
        let _ = self.events.send(DappEvent::StateChanged(self.snapshot()));
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
