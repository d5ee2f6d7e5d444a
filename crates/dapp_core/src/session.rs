use std::{fmt, sync::Arc};

use anyhow::Result;
use shared::domain::{ContractAddress, EthAddress, NumericInput, Quantity, ShortAddress, TxHash};
use thiserror::Error;

use crate::{
    contract::{ContractFactory, SimpleStorage},
    transport::RollupTransport,
};

/// Wallet session established once at startup.
pub struct Session {
    transport: Arc<dyn RollupTransport>,
    account: Option<EthAddress>,
    short_address: Option<ShortAddress>,
    balance: Option<Quantity>,
}

impl Session {
    pub fn new(
        transport: Arc<dyn RollupTransport>,
        account: Option<EthAddress>,
        short_address: Option<ShortAddress>,
        balance: Option<Quantity>,
    ) -> Self {
        Self {
            transport,
            account,
            short_address,
            balance,
        }
    }

    pub fn transport(&self) -> Arc<dyn RollupTransport> {
        Arc::clone(&self.transport)
    }

    pub fn account(&self) -> Option<&EthAddress> {
        self.account.as_ref()
    }

    pub fn short_address(&self) -> Option<&ShortAddress> {
        self.short_address.as_ref()
    }

    pub fn balance(&self) -> Option<&Quantity> {
        self.balance.as_ref()
    }

    /// Re-queries the account balance; a session without an account is left untouched.
    pub async fn refresh_balance(&mut self) -> Result<()> {
        if let Some(account) = &self.account {
            self.balance = Some(self.transport.get_balance(account).await?);
        }
        Ok(())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("account", &self.account)
            .field("short_address", &self.short_address)
            .field("balance", &self.balance)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractRef {
    pub address: ContractAddress,
    pub deploy_tx_hash: Option<TxHash>,
}

#[derive(Debug, Error)]
pub enum ContractSessionError {
    #[error("no wallet account is selected")]
    NoAccount,
    #[error("no contract has been deployed or attached")]
    NoContract,
    #[error("contract address must not be empty")]
    EmptyAddress,
    #[error("contract wrapper reported no address after deployment")]
    MissingDeployedAddress,
    #[error(transparent)]
    Contract(#[from] anyhow::Error),
}

/// The single active contract and the value last read from it.
pub struct ContractSession {
    factory: Arc<dyn ContractFactory>,
    contract: Option<Box<dyn SimpleStorage>>,
    contract_ref: Option<ContractRef>,
    stored_value: Option<Quantity>,
}

impl ContractSession {
    pub fn new(factory: Arc<dyn ContractFactory>) -> Self {
        Self {
            factory,
            contract: None,
            contract_ref: None,
            stored_value: None,
        }
    }

    pub fn contract_ref(&self) -> Option<&ContractRef> {
        self.contract_ref.as_ref()
    }

    pub fn stored_value(&self) -> Option<&Quantity> {
        self.stored_value.as_ref()
    }

    /// Deploys a new instance; on failure the current contract is kept.
    pub async fn deploy_contract(
        &mut self,
        session: &Session,
    ) -> Result<ContractRef, ContractSessionError> {
        let account = session.account().ok_or(ContractSessionError::NoAccount)?;
        let mut contract = self.factory.create(session.transport());
        let tx_hash = contract.deploy(account).await?;
        let address = contract
            .address()
            .cloned()
            .ok_or(ContractSessionError::MissingDeployedAddress)?;
        Ok(self.replace_contract(contract, address, Some(tx_hash)))
    }

    pub fn set_existing_contract_address(
        &mut self,
        session: &Session,
        address: &str,
    ) -> Result<ContractRef, ContractSessionError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(ContractSessionError::EmptyAddress);
        }
        let address = ContractAddress::from(address);
        let mut contract = self.factory.create(session.transport());
        contract.use_deployed(address.clone());
        Ok(self.replace_contract(contract, address, None))
    }

    pub async fn read_stored_value(
        &mut self,
        session: &Session,
    ) -> Result<Quantity, ContractSessionError> {
        let account = session.account().ok_or(ContractSessionError::NoAccount)?;
        let contract = self
            .contract
            .as_ref()
            .ok_or(ContractSessionError::NoContract)?;
        let value = contract.get_stored_value(account).await?;
        self.stored_value = Some(value.clone());
        Ok(value)
    }

    /// Sends `value` as-is; the wrapper decides whether it can be encoded.
    pub async fn write_stored_value(
        &self,
        session: &Session,
        value: NumericInput,
    ) -> Result<(), ContractSessionError> {
        let account = session.account().ok_or(ContractSessionError::NoAccount)?;
        let contract = self
            .contract
            .as_ref()
            .ok_or(ContractSessionError::NoContract)?;
        contract.set_stored_value(value, account).await?;
        Ok(())
    }

    fn replace_contract(
        &mut self,
        contract: Box<dyn SimpleStorage>,
        address: ContractAddress,
        deploy_tx_hash: Option<TxHash>,
    ) -> ContractRef {
        let contract_ref = ContractRef {
            address,
            deploy_tx_hash,
        };
        self.contract = Some(contract);
        self.contract_ref = Some(contract_ref.clone());
        self.stored_value = None;
        contract_ref
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
