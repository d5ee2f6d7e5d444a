use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::events::DappEvent;

pub const PROGRESS_MESSAGE: &str =
    "Transaction in progress. Confirm MetaMask signing dialog and please wait...";
/// Non-progress toasts close on their own after this long.
pub const AUTO_CLOSE_SECS: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationId(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Progress,
    Success,
    Failure,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn auto_closes(&self) -> bool {
        self.kind != NotificationKind::Progress
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.auto_closes() && now - self.created_at >= chrono::Duration::seconds(AUTO_CLOSE_SECS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    Shown(Notification),
    Dismissed(NotificationId),
}

/// Visible toasts plus the event feed the front ends render from.
pub struct NotificationCenter {
    visible: Vec<Notification>,
    events: broadcast::Sender<DappEvent>,
}

impl NotificationCenter {
    pub fn new(events: broadcast::Sender<DappEvent>) -> Self {
        Self {
            visible: Vec::new(),
            events,
        }
    }

    pub fn show(&mut self, kind: NotificationKind, message: impl Into<String>) -> NotificationId {
        let now = Utc::now();
        self.prune_expired(now);
        let notification = Notification {
            id: NotificationId(Uuid::new_v4()),
            kind,
            message: message.into(),
            created_at: now,
        };
        let id = notification.id;
        self.visible.push(notification.clone());
        let _ = self
            .events
            .send(DappEvent::Notification(NotificationEvent::Shown(notification)));
        id
    }

    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let before = self.visible.len();
        self.visible.retain(|n| n.id != id);
        let removed = self.visible.len() != before;
        if removed {
            let _ = self
                .events
                .send(DappEvent::Notification(NotificationEvent::Dismissed(id)));
        }
        removed
    }

    pub fn prune_expired(&mut self, now: DateTime<Utc>) {
        self.visible.retain(|n| !n.is_expired(now));
    }

    pub fn visible(&self) -> &[Notification] {
        &self.visible
    }

    pub fn count_of(&self, kind: NotificationKind) -> usize {
        self.visible.iter().filter(|n| n.kind == kind).count()
    }
}

/// Busy flag tied to the single "in progress" toast.
#[derive(Debug, Default)]
pub struct PendingOperation {
    in_progress: bool,
    toast: Option<NotificationId>,
}

impl PendingOperation {
    pub fn set(&mut self, in_progress: bool, center: &mut NotificationCenter) {
        self.in_progress = in_progress;
        if in_progress && self.toast.is_none() {
            self.toast = Some(center.show(NotificationKind::Progress, PROGRESS_MESSAGE));
        } else if !in_progress {
            if let Some(id) = self.toast.take() {
                center.dismiss(id);
            }
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn toast(&self) -> Option<NotificationId> {
        self.toast
    }
}
