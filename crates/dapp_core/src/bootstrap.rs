//! One-shot session establishment: wallet access, transport, account,
//! short address, balance.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    address::AddressTranslator,
    config::RollupConfig,
    session::Session,
    transport::{JsonRpcTransport, RollupTransport},
    wallet::{is_access_denied, WalletBridge},
};

pub type TransportBuilder = Box<dyn FnOnce(&RollupConfig) -> Arc<dyn RollupTransport> + Send>;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("no wallet provider detected; configure a wallet endpoint to continue")]
    WalletUnavailable,
    #[error("failed to read the selected wallet account")]
    SelectedAccount(#[source] anyhow::Error),
    #[error("failed to derive rollup short address")]
    AddressTranslation(#[source] anyhow::Error),
}

pub struct SessionBootstrapper {
    wallet: WalletBridge,
    rollup: RollupConfig,
    translator: Arc<dyn AddressTranslator>,
    transport_builder: TransportBuilder,
}

impl SessionBootstrapper {
    pub fn new(
        wallet: WalletBridge,
        rollup: RollupConfig,
        translator: Arc<dyn AddressTranslator>,
    ) -> Self {
        Self {
            wallet,
            rollup,
            translator,
            transport_builder: Box::new(default_transport),
        }
    }

    pub fn with_transport_builder(
        mut self,
        builder: impl FnOnce(&RollupConfig) -> Arc<dyn RollupTransport> + Send + 'static,
    ) -> Self {
        self.transport_builder = Box::new(builder);
        self
    }

    /// Consumes the bootstrapper, so a session is established at most once.
    pub async fn run(self) -> Result<Session, BootstrapError> {
        let wallet = match self.wallet {
            WalletBridge::Available(wallet) => wallet,
            WalletBridge::NotAvailable => {
                warn!("no wallet provider detected; a wallet endpoint is required");
                return Err(BootstrapError::WalletUnavailable);
            }
        };

        if let Err(err) = wallet.enable().await {
            if is_access_denied(&err) {
                warn!("wallet account access denied; continuing without an account");
            } else {
                warn!(error = %err, "wallet account access request failed; continuing");
            }
        }

        let transport = (self.transport_builder)(&self.rollup);

        let account = wallet
            .selected_address()
            .await
            .map_err(BootstrapError::SelectedAccount)?;
        info!(account = ?account, "selected wallet account");

        let short_address = account
            .as_ref()
            .map(|address| self.translator.eth_address_to_godwoken_short_address(address))
            .transpose()
            .map_err(BootstrapError::AddressTranslation)?;
        if let Some(short_address) = &short_address {
            info!(%short_address, "derived polyjuice short address");
        }

        // A failed balance query keeps the account; the balance stays unknown
        // until a refresh succeeds.
        let balance = match &account {
            Some(address) => match transport.get_balance(address).await {
                Ok(balance) => Some(balance),
                Err(err) => {
                    error!(%address, "failed to fetch balance: {err:#}");
                    None
                }
            },
            None => None,
        };

        Ok(Session::new(transport, account, short_address, balance))
    }
}

fn default_transport(config: &RollupConfig) -> Arc<dyn RollupTransport> {
    Arc::new(JsonRpcTransport::from_config(config))
}

#[cfg(test)]
#[path = "tests/bootstrap_tests.rs"]
mod tests;
