use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use cinetrack_api::{
    config::{Config, StorageBackend},
    db::{self, Cache, PgStore},
    routes::{create_router, AppState},
    services::catalog::{CatalogProvider, TmdbProvider},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cinetrack_api=debug,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let redis_client = db::create_redis_client(&config.redis_url)?;
    let (cache, cache_writer) = Cache::new(redis_client);

    let catalog: Arc<dyn CatalogProvider> = Arc::new(TmdbProvider::new(
        cache,
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
    ));

    let state = match config.storage {
        StorageBackend::Postgres => {
            let pool = db::create_pool(&config.database_url).await?;
            db::run_migrations(&pool).await?;
            let store = Arc::new(PgStore::new(pool));
            AppState::new(store.clone(), store, catalog)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            AppState::in_memory(catalog)
        }
    };

    let app = create_router(state).layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(
        addr = %config.bind_addr(),
        storage = ?config.storage,
        "Server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache_writer.shutdown().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
