//! HTTP server initialization and runtime setup.
//!
//! Selects the store and cache backends, spawns the click worker, serves
//! the router and drains the click queue on shutdown.

use crate::config::{CodeStrategy, Config};
use crate::domain::click_worker::{
    ClickWorkerSettings, click_queue, drain_with_timeout, run_click_worker,
};
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::persistence::{MemoryLinkRepository, PgLinkRepository};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::code_generator::{CodeGenerator, RandomCodeGenerator, SequentialCodeGenerator};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - the mapping store (PostgreSQL with migrations, or in-memory)
/// - Redis cache (or NullCache fallback)
/// - the short code generator
/// - background click worker
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if the database is unreachable, migrations fail, or the
/// listener cannot be bound.
pub async fn run(config: Config) -> Result<()> {
    let repository = connect_store(&config).await?;
    let cache = connect_cache(&config).await;
    let generator = build_generator(&config, repository.as_ref()).await?;

    let (click_dispatcher, click_rx) = click_queue(config.click_queue_capacity);
    let worker = tokio::spawn(run_click_worker(
        click_rx,
        repository.clone(),
        ClickWorkerSettings {
            batch_size: config.click_batch_size,
            concurrency: config.click_worker_concurrency,
        },
    ));

    let state = AppState::new(
        repository,
        cache,
        generator,
        click_dispatcher,
        config.max_shorten_attempts,
    );
    let app = app_router(state, &config.cors_allowed_origins);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    let served = axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // The router, and with it every click sender, is gone once serve returns.
    tracing::info!("HTTP server stopped, draining click queue");
    drain_with_timeout(
        worker,
        Duration::from_secs(config.shutdown_drain_timeout_seconds),
    )
    .await;

    served.context("HTTP server error")
}

/// Opens the PostgreSQL pool with the configured limits.
pub async fn connect_pool(config: &Config, database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Some(Duration::from_secs(config.db_idle_timeout)))
        .max_lifetime(Some(Duration::from_secs(config.db_max_lifetime)))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");
    Ok(pool)
}

/// Applies pending migrations from `./migrations`.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")
}

/// Builds the mapping store selected by the configuration.
pub async fn connect_store(config: &Config) -> Result<Arc<dyn LinkRepository>> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("No database configured, links are kept in memory only");
        return Ok(Arc::new(MemoryLinkRepository::new()));
    };

    let pool = connect_pool(config, database_url).await?;
    migrate(&pool).await?;

    Ok(Arc::new(PgLinkRepository::new(
        Arc::new(pool),
        config.store_retry_attempts,
    )))
}

/// Connects the redirect cache, falling back to [`NullCache`] when Redis is
/// not configured, not usable with the selected store, or unreachable.
pub async fn connect_cache(config: &Config) -> Arc<dyn CacheService> {
    let redis_url = match config.redis_url.as_deref() {
        Some(url) if config.is_cache_enabled() => url,
        Some(_) => {
            tracing::warn!("REDIS_URL ignored: cached codes would outlive the in-memory store");
            return Arc::new(NullCache::new());
        }
        None => {
            tracing::info!("Cache disabled (NullCache)");
            return Arc::new(NullCache::new());
        }
    };

    match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
        Ok(redis) => {
            tracing::info!("Cache enabled (Redis)");
            Arc::new(redis)
        }
        Err(e) => {
            tracing::warn!("{}. Using NullCache.", e);
            Arc::new(NullCache::new())
        }
    }
}

/// Creates the code generator. The sequential strategy resumes after the
/// number of links already stored.
pub async fn build_generator(
    config: &Config,
    repository: &dyn LinkRepository,
) -> Result<Arc<dyn CodeGenerator>> {
    match config.code_strategy {
        CodeStrategy::Random => Ok(Arc::new(RandomCodeGenerator::new(config.code_length))),
        CodeStrategy::Sequential => {
            let issued = repository
                .count()
                .await
                .context("Failed to count stored links")?;
            tracing::info!("Sequential short codes resume at index {}", issued);

            Ok(Arc::new(SequentialCodeGenerator::with_offset(
                config.code_length,
                issued,
            )))
        }
    }
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

    tracing::info!("Shutdown signal received, finishing in-flight requests");
}
