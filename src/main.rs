//! OpenSASE Coupons - Self-hosted coupon and discount service

use anyhow::Result;
use opensase_coupons::{config::Config, http, store::PgCouponStore};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let db = PgPoolOptions::new().max_connections(config.db_max_connections).connect(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Some(client),
            Err(e) => { tracing::warn!(error = %e, "NATS unavailable, coupon events will not be published"); None }
        },
        None => None,
    };
    if config.admin_token.is_none() {
        tracing::warn!("ADMIN_TOKEN not set, admin endpoints are unauthenticated");
    }

    let state = http::AppState::new(Arc::new(PgCouponStore::new(db)), nats, config.admin_token.clone());
    let app = http::router(state);

    tracing::info!("🚀 OpenSASE Coupons listening on 0.0.0.0:{}", config.port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?, app).await?;
    Ok(())
}
