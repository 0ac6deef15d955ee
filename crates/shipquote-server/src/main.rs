mod api;
mod middleware;
mod quoter;

use std::sync::Arc;
use std::time::Duration;

use shipquote_core::AppConfig;
use shipquote_engine::{load_rate_card, QuoteEngine, RateCard};
use shipquote_postal::PostalClient;
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::RateLimitState,
    quoter::ShippingQuoter,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = shipquote_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let card = match &config.rate_table_path {
        Some(path) => load_rate_card(path)?,
        None => RateCard::default(),
    };
    tracing::info!(
        bands = card.table.bands().len(),
        ceiling_grams = card.table.ceiling_grams(),
        regional = card.regional.is_some(),
        "rate card loaded"
    );

    let postal = PostalClient::with_base_url(
        &config.postal_base_url,
        Duration::from_millis(config.postal_timeout_ms),
        config.postal_max_retries,
    )?;
    let mut quoter = ShippingQuoter::new(QuoteEngine::new(card))
        .with_postal(postal);
    if let Some(pool) = connect_catalog(&config).await {
        quoter = quoter.with_catalog(pool, Duration::from_millis(config.catalog_timeout_ms));
    }

    let state = AppState {
        quoter: Arc::new(quoter),
    };
    let app = build_app(state, RateLimitState::per_minute(config.rate_limit_per_minute));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "shipquote server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Connects to the product catalog when one is configured. A catalog that
/// cannot be reached at startup is skipped; weights then come from product
/// names alone.
async fn connect_catalog(config: &AppConfig) -> Option<PgPool> {
    config.database_url.as_ref()?;

    let pool = match shipquote_db::connect_pool_from_config(config).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(error = %e, "catalog database unreachable; running without catalog");
            return None;
        }
    };
    match shipquote_db::run_migrations(&pool).await {
        Ok(applied) => {
            tracing::info!(applied, "catalog migrations up to date");
            Some(pool)
        }
        Err(e) => {
            tracing::warn!(error = %e, "catalog migrations failed; running without catalog");
            None
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
