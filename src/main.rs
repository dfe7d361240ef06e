//! Stock Price API server
//!
//! Serves BSE bhavcopy records over HTTP through the read-through cache.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stock_price_api::api::create_router;
use stock_price_api::db::{MemoryStockStore, PgStockStore, StockStore};
use stock_price_api::{spawn_cleanup_task, AppState, Config};

/// Main entry point for the stock price API server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the record store and check it answers
/// 4. Create the cache and application state
/// 5. Start background TTL cleanup task
/// 6. Serve the router until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stock_price_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Stock Price API");

    let config = Config::from_env();
    info!(
        "Configuration loaded: cache_max_entries={}, cache_ttl={}s, single_flight={}, port={}, cleanup_interval={}s",
        config.cache_max_entries,
        config.cache_ttl_secs,
        config.cache_single_flight,
        config.server_port,
        config.cleanup_interval_secs
    );

    let store = connect_store(&config).await?;
    store
        .ping()
        .await
        .context("Unable to connect to database")?;

    let state = AppState::from_config(&config, store);
    info!("Query cache initialized");

    let cleanup_handle = spawn_cleanup_task(state.cache.clone(), config.cleanup_interval_secs);

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Picks PostgreSQL when `DATABASE_URL` is set, the in-memory store otherwise.
async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn StockStore>> {
    match &config.database_url {
        Some(url) => {
            let store = PgStockStore::connect(url)
                .await
                .context("Unable to connect to database")?;
            store.migrate().await.context("Database migration failed")?;
            Ok(Arc::new(store))
        }
        None => {
            warn!("DATABASE_URL not set, serving from an empty in-memory store");
            Ok(Arc::new(MemoryStockStore::new()))
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the cleanup task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    cleanup_handle.abort();
    warn!("Cleanup task aborted");
}
