//! Pecha Server
//!
//! REST service over OPF pechas with Pedurma proofreading support.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pecha_server::config::{Config, StorageBackend};
use pecha_server::db;
use pecha_server::opf::OpfStore;
use pecha_server::routes;
use pecha_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "pecha_server=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env: {}, using defaults", e);
        Config::default()
    });

    tracing::info!("Starting Pecha Server v{}", env!("CARGO_PKG_VERSION"));

    let store = match (&config.storage.backend, &config.storage.s3) {
        (StorageBackend::S3, Some(s3)) => {
            tracing::info!("S3 endpoint: {}", s3.endpoint);
            tracing::info!("S3 bucket: {}", s3.bucket);
            OpfStore::with_s3_storage(s3)
                .await
                .context("Failed to initialize S3 storage")?
        }
        _ => {
            tracing::info!("OPF root: {}", config.storage.opf_root.display());
            OpfStore::with_local_storage(config.storage.opf_root.clone())
        }
    };

    // Initialize database
    let db_pool = db::create_pool(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database initialized at {}", config.database.url);
    tracing::info!("Pedurma pecha: {}", config.pedurma.pecha_id);

    let ip = config
        .server
        .host
        .parse()
        .with_context(|| format!("Invalid SERVER_HOST: {}", config.server.host))?;
    let addr = SocketAddr::new(ip, config.server.port);

    let app = routes::app(AppState::new(config, store, db_pool));

    // Start server with graceful shutdown
    tracing::info!("Pecha Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
