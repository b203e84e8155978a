use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};

/// The application's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// The address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// The URL of the PostgreSQL database. `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// Requests admitted per client within any trailing 60 seconds.
    pub requests_per_minute: usize,
    /// How often idle rate limit keys are swept.
    pub rate_limit_sweep: Duration,
    /// The maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            database_url: None,
            requests_per_minute: 100,
            rate_limit_sweep: Duration::from_secs(300),
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// Unset variables fall back to the values of [`Config::default`].
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let bind_addr = match env::var("BIND_ADDR") {
            Ok(raw) => raw.parse().context("BIND_ADDR must be a socket address")?,
            Err(_) => defaults.bind_addr,
        };

        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let requests_per_minute: usize = parse_or("REQUESTS_PER_MINUTE", defaults.requests_per_minute)?;
        if requests_per_minute == 0 {
            anyhow::bail!("REQUESTS_PER_MINUTE must be greater than 0");
        }

        let sweep_secs: u64 = parse_or("RATE_LIMIT_SWEEP_SECS", defaults.rate_limit_sweep.as_secs())?;
        if sweep_secs == 0 {
            anyhow::bail!("RATE_LIMIT_SWEEP_SECS must be greater than 0");
        }

        Ok(Self {
            bind_addr,
            database_url,
            requests_per_minute,
            rate_limit_sweep: Duration::from_secs(sweep_secs),
            max_body_bytes: parse_or("MAX_BODY_BYTES", defaults.max_body_bytes)?,
        })
    }
}

fn parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {name}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_memory_store() {
        let config = Config::default();
        assert!(config.database_url.is_none());
        assert_eq!(config.requests_per_minute, 100);
        assert_eq!(config.max_body_bytes, 1024 * 1024);
    }

    #[test]
    fn parse_or_falls_back_when_unset() {
        let value: usize = parse_or("WORKOUT_LOG_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
