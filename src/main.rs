use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trackify_api::{
    config::Config,
    db::{create_pool, create_redis_client, run_migrations, Cache, PgStore},
    routes::{create_router, AppState},
    services::{
        providers::{CircuitBreaker, GeminiProvider, GenerativeProvider},
        recommendations::{GenerativeAugmenter, WeightedShuffle},
        RecommendationEngine,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trackify_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url, config.database_max_connections)
        .await
        .context("Failed to connect to Postgres")?;
    if config.run_migrations {
        run_migrations(&pool).await?;
    }
    let store = PgStore::new(pool);

    let mut gemini = GeminiProvider::new(
        config.gemini_credential(),
        config.gemini_api_url.clone(),
        config.gemini_model.clone(),
    );

    let mut cache_writer = None;
    if let Some(redis_url) = config.redis_url.as_deref() {
        let client = create_redis_client(redis_url)?;
        match Cache::connect(client).await {
            Ok((cache, writer)) => {
                gemini = gemini.with_cache(cache, config.generative_cache_ttl_secs);
                cache_writer = Some(writer);
                tracing::info!("Completion cache enabled");
            }
            Err(e) => tracing::warn!(error = %e, "Redis unavailable, completions will not be cached"),
        }
    }

    if !gemini.is_configured() {
        tracing::warn!("GEMINI_API_KEY not set, generative recommendations disabled");
    }
    let provider = CircuitBreaker::new(
        Arc::new(gemini),
        config.breaker_failure_threshold,
        config.breaker_cooldown(),
    );

    let engine = RecommendationEngine::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store),
        GenerativeAugmenter::new(Arc::new(provider), config.generative_timeout()),
        WeightedShuffle::new(config.shuffle_keep_order_probability),
    );

    let app = create_router(AppState::new(engine, config.default_page_size));

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address()))?;
    tracing::info!(address = %config.bind_address(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(writer) = cache_writer {
        writer.shutdown().await;
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
