use std::time::Duration;

use anyhow::{Context, Result};
use storage::DatabaseOptions;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database: DatabaseOptions,
    /// Messages buffered per competition channel before slow spectators lag.
    pub broadcast_capacity: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("Cannot load PORT env variable")?
                .parse()
                .context("PORT must be a number")?,
            database_url: std::env::var("DATABASE_URL")
                .context("Cannot load DATABASE_URL env variable")?,
            database: DatabaseOptions {
                max_connections: optional_var("DB_MAX_CONNECTIONS", 10)?,
                acquire_timeout: Duration::from_secs(optional_var("DB_ACQUIRE_TIMEOUT_SECS", 5)?),
                statement_timeout: Duration::from_millis(optional_var("DB_STATEMENT_TIMEOUT_MS", 5000)?),
            },
            broadcast_capacity: optional_var("BROADCAST_CAPACITY", 256)?,
        })
    }
}

fn optional_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number, got '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}
