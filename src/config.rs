//! Service configuration, read from the environment (and `.env` when present).

use anyhow::{Context, Result};

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub nats_url: Option<String>,
    /// Bearer token guarding the admin surface. Unset leaves it open.
    pub admin_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: std::env::var("PORT").unwrap_or_else(|_| "8083".to_string()).parse().context("PORT must be a port number")?,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS").unwrap_or_else(|_| "10".to_string()).parse().context("DB_MAX_CONNECTIONS must be a number")?,
            nats_url: non_empty_var("NATS_URL"),
            admin_token: non_empty_var("ADMIN_TOKEN"),
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
