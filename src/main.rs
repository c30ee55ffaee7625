use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use movie_manager::{
    config::{Config, StorageBackend},
    db::{
        create_redis_client, Cache, FileKeyValueStore, KeyValueStore, MemoryKeyValueStore,
        RedisKeyValueStore, WishlistStore,
    },
    routes::{create_router, AppState},
    services::{ImageUrls, MovieProvider, TmdbProvider, WishlistService},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "movie_manager=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let redis_client = config
        .redis_url
        .as_deref()
        .map(create_redis_client)
        .transpose()
        .context("Invalid REDIS_URL")?;

    // Metadata cache is enabled whenever Redis is configured
    let (cache, cache_handle) = match &redis_client {
        Some(client) => {
            let (cache, handle) = Cache::new(client.clone());
            (Some(cache), Some(handle))
        }
        None => (None, None),
    };

    let backend: Arc<dyn KeyValueStore> = match config.storage_backend {
        StorageBackend::File => Arc::new(
            FileKeyValueStore::open(&config.data_dir)
                .with_context(|| format!("Cannot open data dir {}", config.data_dir.display()))?,
        ),
        StorageBackend::Redis => {
            let client = redis_client
                .clone()
                .context("STORAGE_BACKEND=redis requires REDIS_URL")?;
            Arc::new(RedisKeyValueStore::new(client))
        }
        StorageBackend::Memory => Arc::new(MemoryKeyValueStore::new()),
    };
    tracing::info!(
        backend = backend.name(),
        key = %config.wishlist_key,
        metadata_cache = cache.is_some(),
        "Storage configured"
    );

    let store = WishlistStore::new(backend, config.wishlist_key.clone());
    let (wishlist, writer_handle) = WishlistService::initialize(store).await;

    let provider: Arc<dyn MovieProvider> = Arc::new(TmdbProvider::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        cache,
    ));

    let state = AppState::new(
        Arc::new(wishlist),
        provider,
        ImageUrls::new(config.tmdb_image_url.clone()),
    );
    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(address = %address, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    writer_handle.shutdown().await;
    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
