//! eBlotter server binary.

use anyhow::Context;
use clap::Parser;
use eblotter::config::{Settings, StorageBackend};
use eblotter::infrastructure::persistence::{open_store, seed_if_empty};
use eblotter::{AppState, create_router, telemetry};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Deal blotter API server.
#[derive(Debug, Parser)]
#[command(name = "eblotter", version, about)]
struct Cli {
    /// Settings file (TOML). Defaults to config/eblotter.toml if present.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Record store to use (`json` or `sqlite`), overriding settings.
    #[arg(long, value_name = "BACKEND", value_parser = parse_backend)]
    backend: Option<StorageBackend>,

    /// Seed demo data into empty collections, regardless of settings.
    #[arg(long)]
    seed: bool,
}

fn parse_backend(value: &str) -> Result<StorageBackend, String> {
    value.parse().map_err(|e: eblotter::config::ConfigError| e.to_string())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable, waiting for Ctrl-C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref()).context("loading settings")?;
    if let Some(backend) = cli.backend {
        settings.storage.backend = backend;
    }
    telemetry::init(&settings.log);

    info!(
        name = %settings.app.name,
        version = %settings.app.version,
        backend = %settings.storage.backend,
        "starting"
    );

    let store = open_store(&settings.storage)
        .await
        .with_context(|| format!("opening {} store", settings.storage.backend))?;

    if cli.seed || settings.storage.seed {
        seed_if_empty(store.as_ref())
            .await
            .context("seeding demo data")?;
    }

    let addr = settings.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(addr = %addr, prefix = %settings.app.api_prefix, "listening");

    let app = create_router(AppState::new(store, settings));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;

    info!("stopped");
    Ok(())
}
