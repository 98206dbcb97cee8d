use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nextdrink_api::{
    config::Config,
    db,
    routes::{create_router, AppState},
    services::{
        providers::{CachedCatalogProvider, CatalogProvider, PgCatalogProvider, PgHistoryProvider},
        recommendation::HydrationKeywords,
        EngineSettings,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nextdrink_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(host = %config.host, port = config.port, "Loaded configuration");

    let pool = db::create_pool(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database ready");

    let postgres_catalog: Arc<dyn CatalogProvider> = Arc::new(PgCatalogProvider::new(pool.clone()));
    let (catalog, cache_writer) = match &config.redis_url {
        Some(redis_url) => {
            let client = db::create_redis_client(redis_url)?;
            let (cache, handle) = db::Cache::new(client);
            tracing::info!(ttl = config.catalog_cache_ttl, "Catalog caching enabled");
            let cached: Arc<dyn CatalogProvider> = Arc::new(CachedCatalogProvider::new(
                postgres_catalog,
                cache,
                config.catalog_cache_ttl,
            ));
            (cached, Some(handle))
        }
        None => {
            tracing::info!("REDIS_URL not set, catalog caching disabled");
            (postgres_catalog, None)
        }
    };

    let settings = EngineSettings {
        hydration_keywords: HydrationKeywords::new(&config.hydration_keywords),
        ..Default::default()
    };
    let state = AppState::new(catalog, Arc::new(PgHistoryProvider::new(pool)), settings);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "NextDrink API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_writer {
        handle.shutdown().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
