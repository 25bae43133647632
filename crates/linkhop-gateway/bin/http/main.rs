mod cli;

use crate::cli::{CacheBackendArg, StorageBackendArg, CLI};
use anyhow::Context;
use clap::Parser;
use linkhop_cache::{MokaUrlCache, RedisUrlCache};
use linkhop_core::{Repository, UrlCache, VisitRepository};
use linkhop_gateway::{App, AppState};
use linkhop_generator::RandomGenerator;
use linkhop_redirector::RedirectorService;
use linkhop_shortener::ShortenerService;
use linkhop_storage::{InMemoryRepository, PostgresRepository};
use linkhop_telemetry::TelemetryConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::try_parse()?;

    let _telemetry = linkhop_telemetry::init(
        &TelemetryConfig::builder()
            .service_name("linkhop-gateway")
            .log_format(config.log_format.into())
            .otlp_endpoint(config.otlp_endpoint.clone())
            .build(),
    )
    .context("failed to initialize telemetry")?;

    info!(
        listen_addr = %config.listen_addr,
        storage_backend = %config.storage,
        cache_backend = %config.cache,
        "starting gateway server"
    );

    match config.storage {
        StorageBackendArg::InMemory => {
            with_cache(&config, InMemoryRepository::new()).await?;
        }
        StorageBackendArg::Postgres => {
            let dsn = config
                .postgres_dsn
                .as_deref()
                .context("postgres dsn is required when storage backend is postgres")?;
            let repository = PostgresRepository::connect(dsn, config.postgres_max_connections)
                .await
                .context("failed to connect to Postgres")?;

            let result = with_cache(&config, repository.clone()).await;
            repository.close().await;
            info!("closed Postgres pool");
            result?;
        }
    }

    Ok(())
}

async fn with_cache<R>(config: &CLI, repository: R) -> anyhow::Result<()>
where
    R: Repository + VisitRepository + Clone,
{
    match config.cache {
        CacheBackendArg::InMemory => run_server(config, repository, MokaUrlCache::new()).await,
        CacheBackendArg::Redis => {
            let cache = RedisUrlCache::connect(&config.redis_url)
                .await
                .context("failed to connect to Redis")?;
            run_server(config, repository, cache).await
        }
    }
}

async fn run_server<R, C>(config: &CLI, repository: R, cache: C) -> anyhow::Result<()>
where
    R: Repository + VisitRepository + Clone,
    C: UrlCache,
{
    let shortener = ShortenerService::new(repository.clone(), RandomGenerator::new())
        .with_max_attempts(config.max_shorten_attempts);
    let redirector = RedirectorService::new(repository.clone(), cache);

    let state = AppState::new(
        Arc::new(shortener),
        Arc::new(redirector),
        Arc::new(repository),
    )
    .with_analytics_timeout(Duration::from_millis(config.analytics_timeout_ms));

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(
        listener,
        App::router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
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
                tracing::error!(error = %e, "failed to listen for SIGTERM");
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

    info!("shutdown signal received, draining connections");
}
