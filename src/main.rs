//! Invent Server - Equipment Inventory Management
//!
//! REST API server for tracking equipment, employees and their history.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use invent_server::{
    api,
    config::{AppConfig, LogFormat, LoggingConfig},
    repository::Repository,
    services::{files::LocalFileStore, Services},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_tracing(&config.logging);

    tracing::info!("Starting Invent Server v{}", env!("CARGO_PKG_VERSION"));

    let repository = Repository::connect(&config.database)
        .await
        .context("Failed to open the database")?;

    let files = LocalFileStore::new(config.uploads.directory.clone())
        .await
        .context("Failed to prepare the uploads directory")?;
    tracing::info!("Storing attachments in {}", files.root().display());

    let services = Services::new(repository, &config, Arc::new(files));
    services
        .auth
        .ensure_admin()
        .await
        .context("Failed to seed the admin account")?;

    let host: IpAddr = config
        .server
        .host
        .parse()
        .context("Invalid host address")?;
    let addr = SocketAddr::new(host, config.server.port);

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };
    let app = api::router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Console output in the configured format, plus daily JSON files when a directory is set
fn init_tracing(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("invent_server={},tower_http=debug", config.level).into());

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "invent-server.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);
    match config.format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }

    guard
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
