//! wallet-bridge CLI
//!
//! Every invocation is one simulated page load: a fresh wallet context, the
//! persisted store read from disk, pending handoff recovery, then the
//! requested action.
//!
//! ```text
//! wallet-bridge connect trust --user-agent "iPhone" --no-injected
//!     → no connector, mobile, deep link → handoff recorded, URL printed
//! wallet-bridge resume
//!     → next page load: record consumed, "trust" resolved, connect attempted
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::json;

use wallet_bridge::chain::ChainId;
use wallet_bridge::config::{load_config, WalletConfig};
use wallet_bridge::local::LocalConnector;
use wallet_bridge::observability::init_logging;
use wallet_bridge::wallet::{
    Collaborators, ConnectModal, DeviceKind, FileStore, RecordingNavigator, WalletContext,
};

const DESKTOP_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";

#[derive(Parser)]
#[command(name = "wallet-bridge")]
#[command(about = "Wallet connection orchestration, one page load per run", long_about = None)]
struct Cli {
    /// TOML configuration file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the wallet catalog and the announced connectors
    Wallets,
    /// Pick a wallet, as if clicked in the UI
    Connect {
        wallet: String,

        /// User agent of the simulated browser
        #[arg(long, default_value = DESKTOP_USER_AGENT)]
        user_agent: String,

        /// Do not announce the local wallet (plain mobile browser)
        #[arg(long)]
        no_injected: bool,
    },
    /// Page load that only resumes a pending handoff
    Resume,
    /// Connect the local wallet, sign, switch, send, disconnect
    Demo {
        #[arg(long, default_value = "metaMask")]
        wallet: String,
    },
}

/// Prints instead of rendering the selection modal.
struct ConsoleModal;

impl ConnectModal for ConsoleModal {
    fn open(&self) {
        println!("(no matching wallet: opening the wallet selection modal)");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => WalletConfig::default(),
    };
    init_logging(&config.observability);
    let config = Arc::new(config);

    let (user_agent, announce_local) = match &cli.command {
        Commands::Connect {
            user_agent,
            no_injected,
            ..
        } => (user_agent.as_str(), !no_injected),
        _ => (DESKTOP_USER_AGENT, true),
    };

    let context = WalletContext::new(
        config.clone(),
        Collaborators {
            store: Arc::new(FileStore::open(&config.recovery.store_path)?),
            navigator: Arc::new(RecordingNavigator::new()),
            modal: Arc::new(ConsoleModal),
            device: DeviceKind::from_user_agent(user_agent),
        },
    )?;

    if config.local_wallet.enabled && announce_local {
        match LocalConnector::from_config(&config.local_wallet, Arc::new(config.network_catalog())) {
            Ok(connector) => context.registry().announce(Arc::new(connector)),
            Err(e) => tracing::warn!(error = %e, "Local wallet not announced"),
        }
    }

    let recovery = context.on_page_load().await?;
    tracing::info!(report = ?recovery, "Page load recovery finished");

    match cli.command {
        Commands::Wallets => {
            println!("{}", config.app.identity());
            for descriptor in context.registry().descriptors() {
                let target = match context.registry().resolve(&descriptor.id) {
                    Ok(connector) => connector.name().to_string(),
                    Err(_) => "-".to_string(),
                };
                println!(
                    "{:<16} {:<16} deep link: {:<3} connector: {}",
                    descriptor.id,
                    descriptor.display_name,
                    if descriptor.deep_link.is_some() { "yes" } else { "no" },
                    target
                );
            }
        }
        Commands::Connect { wallet, .. } => {
            let selection = context.select_wallet(&wallet).await?;
            println!("selection: {:?}", selection);
            print_state(&context)?;
        }
        Commands::Resume => {
            println!("recovery: {:?}", recovery);
            print_state(&context)?;
        }
        Commands::Demo { wallet } => run_demo(&context, &wallet).await?,
    }

    Ok(())
}

async fn run_demo(context: &WalletContext, wallet: &str) -> Result<(), Box<dyn std::error::Error>> {
    let selection = context.select_wallet(wallet).await?;
    println!("selection: {:?}", selection);
    if !context.snapshot().is_connected() {
        print_state(context)?;
        return Ok(());
    }

    let signature = context.gateway().sign_default_message().await;
    println!("sign message: {:?}", signature);

    let networks: Vec<ChainId> = context.switcher().catalog().iter().map(|n| n.chain_id).collect();
    for chain_id in networks.iter().rev() {
        let outcome = context.switcher().switch_to(*chain_id).await?;
        println!(
            "switch to {} ({}): {:?}",
            context.switcher().catalog().name_of(*chain_id),
            chain_id,
            outcome
        );
    }
    // Base mainnet is not in the default catalog.
    let outcome = context.switcher().switch_to(ChainId(8453)).await?;
    println!("switch to 8453: {:?}", outcome);

    let tx = context.gateway().send_default_transaction().await;
    println!("send transaction: {:?}", tx);

    print_state(context)?;

    context.orchestrator().disconnect().await;
    println!("after disconnect:");
    print_state(context)?;
    Ok(())
}

fn print_state(context: &WalletContext) -> Result<(), serde_json::Error> {
    let snapshot = context.snapshot();
    let network = snapshot
        .chain_id
        .map(|id| context.switcher().catalog().name_of(id).to_string());
    let state = json!({
        "session": snapshot,
        "network": network,
        "results": context.gateway().ledger(),
    });
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}
