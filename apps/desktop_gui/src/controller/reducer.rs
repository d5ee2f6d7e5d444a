//! Folds backend events into the state the UI renders from.

use chrono::{DateTime, Utc};
use dapp_core::{DappSnapshot, Notification, NotificationEvent};

use super::events::{classify_bootstrap_failure, err_label, UiError, UiEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBanner {
    pub message: String,
}

#[derive(Debug, Default)]
pub struct GuiState {
    pub ready: bool,
    pub snapshot: DappSnapshot,
    pub toasts: Vec<Notification>,
    pub status: String,
    pub status_banner: Option<StatusBanner>,
}

impl GuiState {
    pub fn apply(&mut self, event: UiEvent) {
        match event {
            UiEvent::Info(message) => {
                self.status = message;
            }
            UiEvent::Ready(snapshot) => {
                self.ready = true;
                self.status = match &snapshot.account {
                    Some(account) => format!("Connected as {account}"),
                    None => "Connected without a wallet account".to_string(),
                };
                self.status_banner = None;
                self.snapshot = snapshot;
            }
            UiEvent::State(snapshot) => {
                self.snapshot = snapshot;
            }
            UiEvent::Notification(NotificationEvent::Shown(notification)) => {
                self.toasts.push(notification);
            }
            UiEvent::Notification(NotificationEvent::Dismissed(id)) => {
                self.toasts.retain(|toast| toast.id != id);
            }
            UiEvent::Error(err) => self.apply_error(err),
        }
    }

    fn apply_error(&mut self, err: UiError) {
        tracing::debug!(
            context = ?err.context(),
            category = ?err.category(),
            "ui error: {}",
            err.message()
        );
        self.status = if err.is_blocking() {
            classify_bootstrap_failure(err.message())
        } else {
            format!("{} error: {}", err_label(err.category()), err.message())
        };
        if err.is_blocking() {
            self.status_banner = Some(StatusBanner {
                message: self.status.clone(),
            });
        }
    }

    /// Drops toasts whose auto-close delay has elapsed.
    pub fn prune_toasts(&mut self, now: DateTime<Utc>) {
        self.toasts.retain(|toast| !toast.is_expired(now));
    }

    pub fn dismiss_toast(&mut self, index: usize) {
        if index < self.toasts.len() {
            self.toasts.remove(index);
        }
    }
}
