use shared::domain::{EthAddress, Quantity, ShortAddress};

use crate::{notifications::NotificationEvent, session::ContractRef};

/// Everything the presentation layer renders, captured at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DappSnapshot {
    pub account: Option<EthAddress>,
    pub short_address: Option<ShortAddress>,
    pub balance: Option<Quantity>,
    pub contract: Option<ContractRef>,
    pub stored_value: Option<Quantity>,
    pub transaction_in_progress: bool,
}

#[derive(Debug, Clone)]
pub enum DappEvent {
    Notification(NotificationEvent),
    StateChanged(DappSnapshot),
}
