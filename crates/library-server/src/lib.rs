//! Manga library server.
//!
//! Serves the JSON API and the server-rendered library pages on top of the
//! library service, which searches MangaDex and persists the personal
//! library in SQLite.

pub mod api;
pub mod service;
pub mod state;
pub mod ui;

pub use service::{LibraryService, SaveOutcome, SaveRequest, ServiceError};
pub use state::AppState;

use anyhow::{Context, Result};
use mangadex_client::{MangaDexClient, Normalizer};
use shared::{Config, Database, LibraryStore};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

/// Wire the catalog client, normalizer, and store from configuration
pub fn build_service(config: &Config) -> Result<LibraryService> {
    let db_path = config.database_path();
    info!(db_path = %db_path.display(), "Opening database");
    let database = Database::open(&db_path).context("Failed to open database")?;
    let store = LibraryStore::new(database);

    let catalog = &config.catalog;
    let client = MangaDexClient::new(
        catalog.base_url.clone(),
        catalog.cover_base_url.clone(),
        Duration::from_secs(catalog.timeout_seconds),
    )
    .context("Failed to create MangaDex client")?;
    info!(base_url = client.base_url(), "Catalog client ready");

    Ok(LibraryService::new(
        Arc::new(client),
        Normalizer::new(catalog.cover_base_url.clone()),
        store,
        catalog.search_limit,
    ))
}

/// Serve the application on an already-bound listener until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let router = api::build_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")
}

/// Build everything from configuration, bind, and serve until Ctrl-C/SIGTERM
pub async fn run_server(config: Config) -> Result<()> {
    let service = build_service(&config)?;
    let state = AppState::new(service);

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!(address = %address, "Library server listening");

    serve(listener, state, shutdown_signal()).await?;

    info!("Library server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
