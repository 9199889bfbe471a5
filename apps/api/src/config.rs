use anyhow::{Context, Result};

use crate::connections::affinity::DEFAULT_BATCH_SIZE;
use crate::feed::cache::{DEFAULT_CAPACITY, DEFAULT_TTL};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub port: u16,
    pub rust_log: String,
    pub feed_cache_capacity: usize,
    pub feed_cache_ttl_secs: u64,
    /// Adds the word-usage detector to the default signal set.
    pub enable_word_usage_signals: bool,
    pub affinity_batch_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 10)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            feed_cache_capacity: parse_env("FEED_CACHE_CAPACITY", DEFAULT_CAPACITY)?,
            feed_cache_ttl_secs: parse_env("FEED_CACHE_TTL_SECS", DEFAULT_TTL.as_secs())?,
            enable_word_usage_signals: parse_env("ENABLE_WORD_USAGE_SIGNALS", false)?,
            affinity_batch_size: parse_env("AFFINITY_BATCH_SIZE", DEFAULT_BATCH_SIZE)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_falls_back_to_default() {
        let value: usize = parse_env("SPROUT_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("SPROUT_TEST_BAD_PORT", "not-a-port");
        let result: Result<u16> = parse_env("SPROUT_TEST_BAD_PORT", 8080);
        assert!(result.is_err());
        std::env::remove_var("SPROUT_TEST_BAD_PORT");
    }

    #[test]
    fn test_parse_env_reads_bool() {
        std::env::set_var("SPROUT_TEST_FLAG", "true");
        let flag: bool = parse_env("SPROUT_TEST_FLAG", false).unwrap();
        assert!(flag);
        std::env::remove_var("SPROUT_TEST_FLAG");
    }
}
