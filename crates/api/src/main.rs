use std::sync::Arc;

use anyhow::Context;

use exhibits_api::app::{build_app, services};
use exhibits_api::middleware::AuthState;
use exhibits_auth::AuthMode;
use exhibits_infra::{AppConfig, PgAuthStore, store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = AppConfig::load().context("failed to load configuration")?;
    exhibits_observability::init(cfg.log_format);

    let pool = store::connect(&cfg).await.context("failed to connect to postgres")?;
    let store = Arc::new(PgAuthStore::new(pool));
    store.health_check().await.context("database health check failed")?;

    if cfg.auth_mode == AuthMode::Legacy {
        tracing::warn!("legacy token lookup is deprecated; switch auth_mode to claims");
    }

    let engine = services::build_engine(store.clone(), store, cfg.lookup_timeout());
    let app = build_app(engine, AuthState::new(cfg.auth_mode, &cfg.jwt_secret));

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
