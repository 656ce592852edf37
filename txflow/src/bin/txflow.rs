//! Transaction Flow CLI
//!
//! Plans a bridge intent and prints the resulting transactions, each paired
//! with its signing context, as JSON.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin txflow -- --config config/txflow.toml bridge-in \
//!     --network ethereum --token usdc --method GRAVITY_BRIDGE \
//!     --eth-address 0x... --amount 12.5
//! ```
//!
//! Or set the config path via environment variable:
//!
//! ```bash
//! TXFLOW_CONFIG_PATH=config/txflow.toml cargo run --bin txflow -- bridge-out ...
//! ```

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

use txflow::chains::{CosmosReader, EvmReader, LiveBalances};
use txflow::{
    BridgeDirection, BridgeDispatcher, BridgeSession, Catalog, ContextResolver, FlowConfig,
    SessionProps,
};

#[derive(Parser, Debug)]
#[command(name = "txflow")]
#[command(about = "Plan multi-chain bridge transactions")]
struct Args {
    /// Path to configuration file (default: config/txflow.toml or TXFLOW_CONFIG_PATH env var)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bridge from an external network into the hub
    BridgeIn(BridgeArgs),
    /// Bridge from the hub out to an external network
    BridgeOut(BridgeArgs),
}

#[derive(ClapArgs, Debug)]
struct BridgeArgs {
    /// External network id (source for bridge-in, destination for bridge-out)
    #[arg(long)]
    network: Option<String>,
    /// Token id; defaults to the first available token
    #[arg(long)]
    token: Option<String>,
    /// Bridging method; defaults to the token's first method
    #[arg(long)]
    method: Option<String>,
    /// User EVM address
    #[arg(long)]
    eth_address: String,
    /// User Cosmos address (IBC)
    #[arg(long)]
    cosmos_address: Option<String>,
    /// Human-readable amount
    #[arg(long)]
    amount: String,
    /// Use the testnet hub
    #[arg(long)]
    testnet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt::init();

    let config = Arc::new(FlowConfig::load_from_path(args.config.as_deref())?);
    info!("Configuration loaded: {} networks", config.networks.len());

    let (direction, bridge) = match args.command {
        Command::BridgeIn(bridge) => (BridgeDirection::In, bridge),
        Command::BridgeOut(bridge) => (BridgeDirection::Out, bridge),
    };

    let catalog = Arc::new(Catalog::from_config(&config));
    let evm = Arc::new(EvmReader::new(&config.networks)?);
    let cosmos = Arc::new(CosmosReader::new(&config)?);
    let dispatcher = Arc::new(BridgeDispatcher::from_config(&config, evm.clone(), evm.clone()));
    let balances = Arc::new(LiveBalances {
        evm: evm.clone(),
        cosmos: cosmos.clone(),
    });
    let resolver = ContextResolver::new(&config, cosmos);

    let props = SessionProps {
        testnet: bridge.testnet,
        user_eth_address: Some(bridge.eth_address.clone()),
        user_cosmos_address: bridge.cosmos_address.clone(),
        default_network_id: None,
    };
    let mut session = BridgeSession::new(catalog, direction, props, balances, dispatcher)?;

    if let Some(network) = &bridge.network {
        session.set_network(network)?;
    }
    if let Some(token) = &bridge.token {
        session.set_token(token)?;
    }
    if let Some(method) = &bridge.method {
        session.set_method(method)?;
    }
    session.auto_select()?;
    session.refresh_balances().await;

    let selection = session.snapshot();
    info!(
        "Bridging {:?} via {:?}",
        selection.selected_token.as_ref().map(|t| t.token.symbol.as_str()),
        selection.selected_method
    );

    let txs = session.bridge(&bridge.eth_address, &bridge.amount).await?;
    let prepared = resolver
        .prepare_for_signing(txs, &bridge.eth_address)
        .await?;

    let output = serde_json::json!({
        "selection": selection,
        "transactions": prepared,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("Failed to serialize transactions")?
    );
    Ok(())
}
