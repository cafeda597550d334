//! Configuration loading from environment.

use std::env;

/// Application configuration.
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub secret_key: String,
    pub active_gateway: String,
    pub token_ttl_minutes: i64,
    pub rate_limit_per_minute: Option<u32>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// `DATABASE_URL` and `SECRET_KEY` are required; everything else has a
    /// default.
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let secret_key = env::var("SECRET_KEY")
            .map_err(|_| anyhow::anyhow!("SECRET_KEY environment variable is required"))?;

        let active_gateway = env::var("ACTIVE_GATEWAY").unwrap_or_else(|_| "mock".to_string());

        let token_ttl_minutes = env::var("TOKEN_TTL_MINUTES")
            .unwrap_or_else(|_| "30".to_string())
            .parse()?;

        let rate_limit_per_minute = match env::var("RATE_LIMIT_PER_MINUTE") {
            Ok(raw) => Some(raw.parse()?),
            Err(_) => None,
        };

        Ok(Self {
            port,
            database_url,
            secret_key,
            active_gateway,
            token_ttl_minutes,
            rate_limit_per_minute,
        })
    }
}
