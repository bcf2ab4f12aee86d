use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

use wallet_gateway::config::{load_config, load_from_env};
use wallet_gateway::lifecycle::{build_state, signals, Shutdown};
use wallet_gateway::observability::{logging, metrics};
use wallet_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "wallet-gateway")]
#[command(about = "Wallet session authentication gateway", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults plus environment overrides when omitted.
    #[arg(short, long, env = "WALLET_GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => load_from_env()?,
    };

    logging::init_tracing(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "wallet-gateway starting");

    tracing::info!(
        mode = %config.mode,
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        rules = config.gateway.rules.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let state = build_state(config)?;

    let shutdown = Shutdown::new();
    tokio::spawn(signals::trigger_on_signal(shutdown.clone()));

    HttpServer::new(state).run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
