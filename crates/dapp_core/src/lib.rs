pub mod address;
pub mod bootstrap;
pub mod config;
pub mod contract;
pub mod controller;
pub mod events;
pub mod notifications;
pub mod session;
pub mod transport;
pub mod view;
pub mod wallet;

pub use address::{AddressTranslator, GodwokenAddressTranslator};
pub use bootstrap::{BootstrapError, SessionBootstrapper};
pub use config::{
    load_settings, ConfigError, DappSettings, ReceiptWait, RollupConfig, SettingsOverrides,
};
pub use contract::{ContractFactory, RpcSimpleStorageFactory, SimpleStorage};
pub use controller::{DappController, OperationOutcome};
pub use events::{DappEvent, DappSnapshot};
pub use notifications::{Notification, NotificationEvent, NotificationId, NotificationKind};
pub use session::{ContractRef, ContractSession, ContractSessionError, Session};
pub use transport::{JsonRpcTransport, RollupTransport};
pub use view::{InputState, ViewModel};
pub use wallet::{JsonRpcWallet, WalletBridge, WalletProvider};

use std::sync::Arc;

use anyhow::Context;

/// Wires the production adapters from settings and runs bootstrap.
pub async fn connect(settings: &DappSettings) -> anyhow::Result<DappController> {
    let rollup = settings.rollup_config();
    let translator =
        GodwokenAddressTranslator::new(&rollup).context("invalid rollup address parameters")?;
    let wallet = WalletBridge::detect(settings.wallet_url.as_deref());
    let session = SessionBootstrapper::new(wallet, rollup, Arc::new(translator))
        .run()
        .await?;
    let factory = RpcSimpleStorageFactory::new(&settings.contract_artifact, settings.receipt_wait());
    Ok(DappController::new(session, Arc::new(factory)))
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/fakes.rs"]
mod test_fakes;
