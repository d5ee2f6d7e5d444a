//! Pure projection of controller state into what the screens render.

use shared::domain::{NumericInput, Quantity};

use crate::events::DappSnapshot;

/// Balances are shown in CKB units of 10^8 shannons.
pub const BALANCE_DECIMALS: u32 = 8;
pub const PLACEHOLDER: &str = "-";

pub fn format_balance(balance: &Quantity) -> String {
    balance.div_pow10(BALANCE_DECIMALS).to_string()
}

/// Raw text of the two input fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    pub existing_contract_address: String,
    pub new_stored_value: NumericInput,
}

impl InputState {
    pub fn set_new_stored_value_text(&mut self, text: &str) {
        self.new_stored_value = NumericInput::parse(text);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub eth_address: String,
    pub short_address: String,
    /// `None` while the balance is still loading.
    pub balance: Option<String>,
    pub contract_address: String,
    pub deploy_tx_hash: String,
    pub stored_value: Option<String>,
    pub new_stored_value_label: String,
    pub transaction_in_progress: bool,
    pub deploy_enabled: bool,
    pub use_existing_enabled: bool,
    pub get_enabled: bool,
    pub set_enabled: bool,
}

impl ViewModel {
    pub fn build(snapshot: &DappSnapshot, inputs: &InputState) -> Self {
        let balance_known = snapshot.balance.is_some();
        let contract_known = snapshot.contract.is_some();

        Self {
            eth_address: display_or_placeholder(snapshot.account.as_ref()),
            short_address: display_or_placeholder(snapshot.short_address.as_ref()),
            balance: snapshot.balance.as_ref().map(format_balance),
            contract_address: display_or_placeholder(
                snapshot.contract.as_ref().map(|c| &c.address),
            ),
            deploy_tx_hash: display_or_placeholder(
                snapshot
                    .contract
                    .as_ref()
                    .and_then(|c| c.deploy_tx_hash.as_ref()),
            ),
            stored_value: snapshot.stored_value.as_ref().map(ToString::to_string),
            new_stored_value_label: inputs.new_stored_value.to_string(),
            transaction_in_progress: snapshot.transaction_in_progress,
            deploy_enabled: balance_known,
            use_existing_enabled: balance_known && !inputs.existing_contract_address.is_empty(),
            get_enabled: contract_known,
            set_enabled: contract_known,
        }
    }
}

fn display_or_placeholder<T: std::fmt::Display>(value: Option<&T>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), ToString::to_string)
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
