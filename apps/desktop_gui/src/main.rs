use std::path::PathBuf;

mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use crossbeam_channel::bounded;
use dapp_core::{load_settings, SettingsOverrides};
use eframe::egui;
use tracing_subscriber::EnvFilter;

use backend_bridge::commands::BackendCommand;
use controller::events::{UiError, UiErrorContext, UiEvent};
use ui::DappGuiApp;

#[derive(Parser, Debug)]
#[command(about = "Desktop front end for the SimpleStorage rollup dapp")]
struct Args {
    /// Settings file (defaults to ./dapp.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    rpc_url: Option<String>,
    #[arg(long)]
    wallet_url: Option<String>,
    /// Start without a wallet bridge.
    #[arg(long)]
    no_wallet: bool,
    #[arg(long)]
    artifact: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            web3_provider_url: self.rpc_url.clone(),
            wallet_url: self.wallet_url.clone(),
            contract_artifact: self.artifact.clone(),
            no_wallet: self.no_wallet,
        }
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(1024);

    let settings = load_settings(args.config.as_deref()).and_then(|mut settings| {
        args.overrides().apply(&mut settings)?;
        Ok(settings)
    });
    match settings {
        Ok(settings) => {
            tracing::info!(
                rpc_url = %settings.web3_provider_url,
                wallet = settings.wallet_url.is_some(),
                "starting desktop gui"
            );
            backend_bridge::runtime::launch(settings, cmd_rx, ui_tx);
        }
        Err(err) => {
            tracing::error!("invalid settings: {err}");
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                UiErrorContext::BackendStartup,
                format!("backend worker startup failure: {err}"),
            )));
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("SimpleStorage Dapp")
            .with_inner_size([980.0, 640.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "SimpleStorage Dapp",
        options,
        Box::new(|_cc| Ok(Box::new(DappGuiApp::new(cmd_tx, ui_rx)))),
    )
}

#[cfg(test)]
mod tests {
    use super::Args;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn flags_map_onto_settings_overrides() {
        let args = Args::parse_from([
            "desktop_gui",
            "--rpc-url",
            "http://127.0.0.1:8024",
            "--artifact",
            "build/SimpleStorage.json",
            "--no-wallet",
        ]);
        let overrides = args.overrides();
        assert_eq!(
            overrides.web3_provider_url.as_deref(),
            Some("http://127.0.0.1:8024")
        );
        assert_eq!(
            overrides.contract_artifact,
            Some(PathBuf::from("build/SimpleStorage.json"))
        );
        assert!(overrides.no_wallet);
        assert_eq!(overrides.wallet_url, None);
    }
}
