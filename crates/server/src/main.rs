mod bootstrap;
mod catalog;
mod health;
mod products;

use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use storefront_core::config::{AppConfig, LoadOptions};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "storefront-server", about = "Serve the storefront product read API")]
struct Args {
    /// Settings file to use instead of `storefront.toml` or `config/storefront.toml`.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn init_logging(config: &AppConfig) {
    use storefront_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run(Args::parse()).await
}

async fn run(args: Args) -> Result<()> {
    let config = AppConfig::load(LoadOptions { config_path: args.config })?;
    init_logging(&config);

    let app = bootstrap::bootstrap(config).await?;
    let address = app.config.listen_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        "storefront-server listening"
    );

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let router = app.router();
    let server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
    });

    let grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    let outcome = supervise(server, shutdown_tx, tokio::signal::ctrl_c(), grace).await;

    app.db_pool.close().await;
    outcome
}

/// Runs until `signal` fires or the server task ends on its own.
///
/// On a signal the server is asked to drain and given `grace` to finish.
/// A server that stops first is an error, so a dead listener ends the process.
async fn supervise(
    mut server: JoinHandle<io::Result<()>>,
    shutdown_tx: oneshot::Sender<()>,
    signal: impl Future<Output = io::Result<()>>,
    grace: Duration,
) -> Result<()> {
    tokio::select! {
        joined = &mut server => {
            joined??;
            anyhow::bail!("server stopped before a shutdown signal");
        }
        received = signal => received?,
    }

    info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "storefront-server stopping"
    );
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(grace, server).await {
        Ok(joined) => joined??,
        Err(_) => warn!(
            event_name = "system.server.shutdown_timeout",
            correlation_id = "shutdown",
            grace_secs = grace.as_secs(),
            "in-flight requests did not drain before the grace period elapsed"
        ),
    }
    Ok(())
}
