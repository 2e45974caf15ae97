//! git-relay: Git smart-HTTP reverse proxy.
//!
//! Lets browser-hosted Git clients reach hosting providers that forbid
//! cross-origin credentialed requests.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────────┐
//!                      │                      GIT RELAY                       │
//!                      │                                                      │
//!  Git client          │  ┌─────────┐    ┌─────────────┐    ┌──────────────┐  │
//!  GET/POST ───────────┼─▶│  http   │───▶│   routing   │───▶│   security   │  │
//!  /api/git-proxy/...  │  │ server  │    │ URL rebuild │    │ credentials  │  │
//!                      │  └─────────┘    └─────────────┘    └──────┬───────┘  │
//!                      │                                           │          │
//!                      │                                           ▼          │
//!  Streamed response   │  ┌─────────┐                       ┌──────────────┐  │
//!  ◀───────────────────┼──│response │◀──────────────────────│    relay     │◀─┼── Git host
//!                      │  │ shaping │                       │   reqwest    │  │   (GitHub,
//!                      │  └─────────┘                       └──────────────┘  │    GitLab..)
//!                      │                                                      │
//!                      │  config · observability · lifecycle                  │
//!                      └──────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use git_relay::config::{load_config, validate_config, ConfigError, ProxyConfig};
use git_relay::lifecycle::{signals, Shutdown};
use git_relay::observability::{logging, metrics};
use git_relay::HttpServer;

#[derive(Parser)]
#[command(name = "git-relay")]
#[command(about = "Git smart-HTTP relay with server-side credential injection", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability)?;

    tracing::info!("git-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        mount_path = %config.upstream.mount_path,
        connect_timeout_secs = ?config.timeouts.connect_secs,
        request_timeout_secs = ?config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let server = HttpServer::new(config)?;

    // Bind last: traffic only once everything is ready.
    let listener = TcpListener::bind(&server.config().listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown);

    server.run(listener, signal).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
