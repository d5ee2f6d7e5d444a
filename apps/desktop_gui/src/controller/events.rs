//! UI/backend events and error modeling for desktop GUI controller.

use dapp_core::{DappSnapshot, NotificationEvent};

#[derive(Debug, Clone)]
pub enum UiEvent {
    Info(String),
    /// Bootstrap finished; the session is usable from here on.
    Ready(DappSnapshot),
    State(DappSnapshot),
    Notification(NotificationEvent),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Wallet,
    Transport,
    Contract,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Bootstrap,
    Deploy,
    Read,
    Write,
    General,
}

pub fn classify_bootstrap_failure(message: &str) -> String {
    let lower = message.to_ascii_lowercase();
    if lower.contains("no wallet provider") {
        "No wallet detected. Start a wallet endpoint (or set WALLET_URL) and relaunch.".to_string()
    } else if lower.contains("error sending request")
        || lower.contains("connection refused")
        || lower.contains("dns")
        || lower.contains("timed out")
    {
        "Rollup node unreachable; check WEB3_PROVIDER_URL and network, then relaunch.".to_string()
    } else {
        format!("Session setup failed: {message}")
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("wallet")
            || message_lower.contains("account access")
            || message_lower.contains("user rejected")
            || message_lower.contains("denied")
        {
            UiErrorCategory::Wallet
        } else if message_lower.contains("revert")
            || message_lower.contains("contract")
            || message_lower.contains("receipt")
            || message_lower.contains("uint256")
        {
            UiErrorCategory::Contract
        } else if message_lower.contains("invalid")
            || message_lower.contains("missing")
            || message_lower.contains("malformed")
            || message_lower.contains("must not be empty")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("rpc")
            || message_lower.contains("unavailable")
            || message_lower.contains("disconnect")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Startup problems leave the app unusable and get a sticky banner.
    pub fn is_blocking(&self) -> bool {
        matches!(
            self.context,
            UiErrorContext::BackendStartup | UiErrorContext::Bootstrap
        )
    }
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Wallet => "Wallet",
        UiErrorCategory::Transport => "Network",
        UiErrorCategory::Contract => "Contract",
        UiErrorCategory::Validation => "Input",
        UiErrorCategory::Unknown => "Unexpected",
    }
}
