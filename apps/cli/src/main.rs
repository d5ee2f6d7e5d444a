use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use dapp_core::{
    connect, load_settings, DappController, DappEvent, InputState, NotificationEvent,
    NotificationKind, OperationOutcome, SettingsOverrides, ViewModel,
};
use shared::domain::NumericInput;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "simple-storage", about = "Headless SimpleStorage rollup dapp")]
struct Args {
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    rpc_url: Option<String>,
    #[arg(long, global = true)]
    wallet_url: Option<String>,
    #[arg(long, global = true)]
    artifact: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show account, short address and balance.
    Status,
    /// Deploy a new SimpleStorage contract.
    Deploy,
    /// Read the stored value of an existing contract.
    Get {
        #[arg(long)]
        contract: String,
    },
    /// Write a new stored value to an existing contract.
    Set {
        #[arg(long)]
        contract: String,
        #[arg(allow_negative_numbers = true)]
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    SettingsOverrides {
        web3_provider_url: args.rpc_url,
        wallet_url: args.wallet_url,
        contract_artifact: args.artifact,
        no_wallet: false,
    }
    .apply(&mut settings)?;

    let mut controller = connect(&settings).await?;
    let mut events = controller.subscribe_events();

    let outcome = match args.command {
        Command::Status => OperationOutcome::Succeeded,
        Command::Deploy => controller.deploy_contract().await,
        Command::Get { contract } => {
            attach(&mut controller, &contract, &mut events)?;
            controller.get_stored_value().await
        }
        Command::Set { contract, value } => {
            attach(&mut controller, &contract, &mut events)?;
            controller
                .set_new_stored_value(NumericInput::parse(&value))
                .await
        }
    };

    print_notifications(&mut events);
    print_view(&controller);

    if !outcome.succeeded() {
        bail!("operation failed; see log output above");
    }
    Ok(())
}

fn attach(
    controller: &mut DappController,
    address: &str,
    events: &mut broadcast::Receiver<DappEvent>,
) -> Result<()> {
    if !controller.set_existing_contract_address(address).succeeded() {
        print_notifications(events);
        bail!("could not use contract address '{address}'");
    }
    Ok(())
}

fn print_notifications(events: &mut broadcast::Receiver<DappEvent>) {
    while let Ok(event) = events.try_recv() {
        if let DappEvent::Notification(NotificationEvent::Shown(notification)) = event {
            let tag = match notification.kind {
                NotificationKind::Progress => "..",
                NotificationKind::Success => "ok",
                NotificationKind::Failure => "!!",
                NotificationKind::Info => "--",
            };
            println!("[{tag}] {}", notification.message);
        }
    }
}

fn print_view(controller: &DappController) {
    let view = ViewModel::build(&controller.snapshot(), &InputState::default());
    println!("ETH address:       {}", view.eth_address);
    println!("Polyjuice address: {}", view.short_address);
    println!(
        "Balance:           {}",
        view.balance.as_deref().unwrap_or("unknown")
    );
    println!("Contract address:  {}", view.contract_address);
    println!("Deploy tx hash:    {}", view.deploy_tx_hash);
    if let Some(stored) = view.stored_value {
        println!("Stored value:      {stored}");
    }
}
