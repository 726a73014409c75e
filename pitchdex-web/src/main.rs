//! pitchdex-web - Review and author table server
//!
//! Serves the table UI and the DataTables JSON endpoints over a read-only
//! connection to the database written by pitchdex-score.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pitchdex_common::config::{resolve_database_path, TomlConfig};
use pitchdex_web::{build_router, datatables, db, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for pitchdex-web
#[derive(Parser, Debug)]
#[command(name = "pitchdex-web")]
#[command(about = "Review and author tables for Pitchdex")]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long, env = "PITCHDEX_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the SQLite database (overrides config)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Address to bind (overrides config)
    #[arg(long, env = "PITCHDEX_HOST")]
    host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "PITCHDEX_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "pitchdex_web={0},pitchdex_common={0},tower_http={0}",
                    config.logging.level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pitchdex web v{}", env!("CARGO_PKG_VERSION"));

    datatables::validate_columns().context("Invalid table column configuration")?;

    let db_path = resolve_database_path(args.database.as_deref(), &config);
    info!("Database path: {}", db_path.display());
    let pool = db::connect_readonly(&db_path).await?;
    info!("Connected to database (read-only)");

    let app = build_router(AppState::new(pool));

    let host = args.host.unwrap_or(config.http.host);
    let port = args.port.unwrap_or(config.http.port);
    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind to {}:{}", host, port))?;
    let addr = listener.local_addr().context("Listener has no local address")?;
    info!("pitchdex-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
