//! Duel Service binary

use anyhow::Context;
use duel_core::{DuelRegistry, DuelStore, FileStore, MemoryStore};
use duel_server::config::{ServerConfig, StoreBackend};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    let store: Arc<dyn DuelStore> = match &config.store {
        StoreBackend::Memory => {
            info!("Using in-memory duel store (records are lost on exit)");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::File(dir) => {
            info!("Using file duel store at {}", dir.display());
            Arc::new(
                FileStore::open(dir)
                    .await
                    .with_context(|| format!("opening duel store at {}", dir.display()))?,
            )
        }
    };

    let registry = Arc::new(DuelRegistry::new(store));
    let app = duel_server::create_router(registry.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Duel service listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    registry.flush().await?;
    info!("Duel service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
