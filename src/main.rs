//! Vigilance Engine server binary.
//!
//! Loads configuration from the environment, selects PostgreSQL or the
//! in-memory store, and serves the REST API until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vigilance_engine::adapters::http::{api_router, with_middleware, AppState};
use vigilance_engine::adapters::memory::InMemoryStore;
use vigilance_engine::adapters::postgres::{self, PostgresAccountRepository, PostgresProgressRepository};
use vigilance_engine::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config);
    config.validate().context("invalid configuration")?;

    let settings = config.gameplay.progress_settings();
    let expose_internal_errors = !config.is_production();

    let state = match &config.database {
        Some(database) => {
            info!(url = %database.redacted_url(), "connecting to PostgreSQL");
            let pool = postgres::connect(database)
                .await
                .context("failed to connect to PostgreSQL")?;
            if database.run_migrations {
                postgres::migrate(&pool).await.context("failed to run migrations")?;
            }
            let progress = Arc::new(PostgresProgressRepository::new(pool.clone()));
            let accounts = Arc::new(PostgresAccountRepository::new(pool));
            AppState::new(progress.clone(), progress, accounts, settings, expose_internal_errors)
        }
        None => {
            warn!("no database configured; progress is kept in memory and lost on exit");
            AppState::in_memory(Arc::new(InMemoryStore::new()), settings, expose_internal_errors)
        }
    };

    let app = with_middleware(api_router(state), &config.server);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, environment = ?config.server.environment, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
