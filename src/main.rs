//! Wallet gateway.
//!
//! A small custodial-wallet API built with Tokio, Axum and alloy.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                  WALLET GATEWAY                   │
//!                     │                                                   │
//!   Client Request    │  ┌─────────┐    ┌──────────┐    ┌─────────────┐  │
//!   ──────────────────┼─▶│  http   │───▶│ service  │───▶│ transaction │  │
//!                     │  │ server  │    │ (context)│    │  executor   │  │
//!                     │  └─────────┘    └────┬─────┘    └──────┬──────┘  │
//!                     │                      │                 │         │
//!                     │                      ▼                 ▼         │
//!                     │               ┌──────────────┐   ┌──────────┐    │
//!                     │               │   active     │◀──│  wallet  │    │
//!                     │               │  connection  │   │ (signer) │    │
//!                     │               └──────┬───────┘   └──────────┘    │
//!                     │                      │ chosen at startup          │
//!                     │                      │ by the endpoint prober     │
//!                     └──────────────────────┼───────────────────────────┘
//!                                            ▼
//!                                     EVM JSON-RPC node
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use wallet_gateway::config::load_config;
use wallet_gateway::error::StartupError;
use wallet_gateway::http::HttpServer;
use wallet_gateway::lifecycle::{bootstrap, signals, Shutdown};
use wallet_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "wallet-gateway", version, about = "Custodial wallet gateway")]
struct Args {
    /// TOML config file; every setting has a default.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Startup failed: {}", e);
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "wallet-gateway starting");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Gateway failed");
        std::process::exit(1);
    }

    tracing::info!("Shutdown complete");
}

async fn run(config: wallet_gateway::GatewayConfig) -> Result<(), StartupError> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        chain_id = config.blockchain.chain_id,
        endpoints = config.blockchain.rpc_urls.len(),
        "Configuration loaded"
    );

    let service = bootstrap(&config).await?;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    let shutdown = Arc::new(Shutdown::new());
    signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(&config, service);
    server
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)
}
