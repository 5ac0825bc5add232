use std::net::SocketAddr;
use std::sync::Arc;
use anyhow::Context;
use fareline_api::{app, AppState};
use fareline_core::{MemoryResultCache, ResultCache, SearchService};
use fareline_store::app_config::{CacheBackend, Config};
use fareline_store::{HttpProviderClient, RedisResultCache};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fareline_api=debug,fareline_core=debug,fareline_store=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Fareline API on port {}", config.server.port);

    let providers = HttpProviderClient::new(&config.providers.base_url, config.providers.timeout())
        .context("Failed to build provider HTTP client")?;
    tracing::info!("Scraper API at {}", config.providers.base_url);

    let cache: Arc<dyn ResultCache> = match config.cache.backend {
        CacheBackend::Memory => Arc::new(MemoryResultCache::new()),
        CacheBackend::Redis => {
            tracing::info!("Using Redis result cache at {}", config.redis.url);
            Arc::new(RedisResultCache::new(&config.redis.url).context("Invalid Redis URL")?)
        }
    };

    let search = SearchService::new(Arc::new(providers), cache, config.cache.search_settings());
    let app = app(AppState::new(search));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
