//! Runtime bridge between UI command queue and backend event intake.

use std::thread;

use crossbeam_channel::{Receiver, Sender};
use dapp_core::{DappController, DappEvent, DappSettings};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(settings: DappSettings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let _ = ui_tx.try_send(UiEvent::Info("Connecting to wallet and rollup...".to_string()));
            let mut controller = match dapp_core::connect(&settings).await {
                Ok(controller) => controller,
                Err(err) => {
                    tracing::error!("session bootstrap failed: {err:#}");
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                        UiErrorContext::Bootstrap,
                        format!("{err:#}"),
                    )));
                    return;
                }
            };

            let event_task = tokio::spawn(forward_events(
                controller.subscribe_events(),
                ui_tx.clone(),
            ));

            let _ = ui_tx.try_send(UiEvent::Ready(controller.snapshot()));
            tracing::info!("backend worker ready");

            // One command at a time, in arrival order.
            while let Ok(cmd) = cmd_rx.recv() {
                tracing::info!(command = cmd.name(), "backend: handling command");
                handle_command(&mut controller, cmd, &ui_tx).await;
            }

            event_task.abort();
        });
    });
}

async fn forward_events(mut events: broadcast::Receiver<DappEvent>, ui_tx: Sender<UiEvent>) {
    loop {
        let evt = match events.recv().await {
            Ok(DappEvent::Notification(notification)) => UiEvent::Notification(notification),
            Ok(DappEvent::StateChanged(snapshot)) => UiEvent::State(snapshot),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "ui event forwarder lagged behind backend events");
                continue;
            }
            Err(RecvError::Closed) => break,
        };
        let _ = ui_tx.try_send(evt);
    }
}

async fn handle_command(
    controller: &mut DappController,
    cmd: BackendCommand,
    ui_tx: &Sender<UiEvent>,
) {
    let name = cmd.name();
    let (context, outcome) = match cmd {
        BackendCommand::DeployContract => {
            (UiErrorContext::Deploy, controller.deploy_contract().await)
        }
        BackendCommand::UseExistingContract { address } => (
            UiErrorContext::General,
            controller.set_existing_contract_address(&address),
        ),
        BackendCommand::GetStoredValue => {
            (UiErrorContext::Read, controller.get_stored_value().await)
        }
        BackendCommand::SetStoredValue { value } => (
            UiErrorContext::Write,
            controller.set_new_stored_value(value).await,
        ),
        BackendCommand::RefreshBalance => {
            (UiErrorContext::General, controller.refresh_balance().await)
        }
    };
    // Status line only; the controller has already raised a toast.
    if !outcome.succeeded() {
        let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
            context,
            format!("{name} did not complete; see log output"),
        )));
    }
}
