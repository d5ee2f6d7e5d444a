//! Backend commands queued from UI to backend worker.

use shared::domain::NumericInput;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    DeployContract,
    UseExistingContract { address: String },
    GetStoredValue,
    SetStoredValue { value: NumericInput },
    RefreshBalance,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DeployContract => "deploy_contract",
            Self::UseExistingContract { .. } => "use_existing_contract",
            Self::GetStoredValue => "get_stored_value",
            Self::SetStoredValue { .. } => "set_stored_value",
            Self::RefreshBalance => "refresh_balance",
        }
    }
}
