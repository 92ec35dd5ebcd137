//! Terminal front end for a WavePortal contract, talking to a JSON-RPC node
//! that manages its own accounts.

mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use wv_chain_client::WalletProvider;
use wv_chain_http::HttpProvider;
use wv_client::{ClientConfig, WaveClient};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Node URL (falls back to WAVE_RPC_URL, then http://localhost:8545)
    #[arg(long)]
    rpc_url: Option<String>,
    /// WavePortal contract address (falls back to WAVE_CONTRACT_ADDRESS)
    #[arg(long)]
    contract: Option<String>,
    /// Gas ceiling for wave transactions (falls back to WAVE_GAS_LIMIT)
    #[arg(long)]
    gas_limit: Option<u64>,
    /// Receipt and event polling period (falls back to WAVE_POLL_INTERVAL_MS)
    #[arg(long)]
    poll_interval_ms: Option<u64>,
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the wave count and history for the authorized account
    Status,
    /// Authorize an account with the node
    Connect,
    /// Send a wave and wait for it to be mined
    Wave {
        /// Message attached to the wave; sent as-is
        #[arg(long, short, default_value = "")]
        message: String,
    },
    /// Print new waves as they arrive until ctrl-c
    Watch,
}

type Client = WaveClient<HttpProvider>;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(contract) = cli.contract {
        config = config.with_contract_address(contract);
    }
    if let Some(gas_limit) = cli.gas_limit {
        config = config.with_gas_limit(gas_limit);
    }
    if let Some(millis) = cli.poll_interval_ms {
        config = config.with_poll_interval(Duration::from_millis(millis));
    }

    let provider = Arc::new(HttpProvider::new(cli.rpc_url));
    info!(
        endpoint = provider.endpoint(),
        contract = %config.contract_address,
        "wave-cli starting"
    );

    let client = WaveClient::new(config, Some(provider));
    client.mount().await;

    let outcome = match cli.cmd {
        Commands::Status => {
            print!("{}", render::render(&client.view()));
            Ok(())
        }
        Commands::Connect => connect(&client).await,
        Commands::Wave { message } => wave(&client, &message).await,
        Commands::Watch => watch(&client).await,
    };

    finish(&client, outcome).await
}

/// Removes the live filter. A teardown failure is only logged so the
/// command's own result is what the process reports.
async fn finish<P: WalletProvider>(client: &WaveClient<P>, outcome: Result<()>) -> Result<()> {
    if let Err(err) = client.unsubscribe().await {
        warn!("failed to remove NewWave filter: {err}");
    }
    outcome
}

async fn connect(client: &Client) -> Result<()> {
    let account = client.connect().await?;
    println!("connected {account}");
    print!("{}", render::render(&client.view()));
    Ok(())
}

async fn wave(client: &Client, message: &str) -> Result<()> {
    if client.account().is_none() {
        client.connect().await?;
    }

    let receipt = client
        .submit_wave(message, |tx_hash| println!("submitted {tx_hash}, mining..."))
        .await?;
    match receipt.block_number {
        Some(block) => println!("mined {} in block {block}", receipt.tx_hash),
        None => println!("mined {}", receipt.tx_hash),
    }
    print!("{}", render::render(&client.view()));
    Ok(())
}

async fn watch(client: &Client) -> Result<()> {
    print!("{}", render::render(&client.view()));
    let interval = client.config().poll_interval;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("stopping watch");
                return Ok(());
            }
            _ = tokio::time::sleep(interval) => {
                let before = client.view().waves.len();
                match client.poll_live().await {
                    Ok(0) => {}
                    Ok(_) => {
                        for wave in client.view().waves.iter().skip(before) {
                            println!();
                            print!("{}", render::wave_block(wave));
                        }
                    }
                    Err(err) => warn!("poll for new waves failed: {err}"),
                }
            }
        }
    }
}
