use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

/// Which `RemoteStore` implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Redis,
    S3,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::Redis => "redis",
            StoreBackend::S3 => "s3",
        }
    }
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "redis" => Ok(StoreBackend::Redis),
            "s3" => Ok(StoreBackend::S3),
            other => Err(anyhow!(
                "STORE_BACKEND must be one of memory, redis, s3 (got '{other}')"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub endpoint: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if the selected backend is missing its settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub redis_url: Option<String>,
    pub s3: Option<S3Settings>,
    pub store_timeout: Duration,
    pub success_dismiss: Duration,
    pub error_dismiss: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let store_backend: StoreBackend = std::env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .parse()?;

        let redis_url = match store_backend {
            StoreBackend::Redis => Some(require_env("REDIS_URL")?),
            _ => std::env::var("REDIS_URL").ok(),
        };

        let s3 = match store_backend {
            StoreBackend::S3 => Some(S3Settings {
                bucket: require_env("S3_BUCKET")?,
                endpoint: require_env("S3_ENDPOINT")?,
                region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
                access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
                secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            }),
            _ => None,
        };

        Ok(Config {
            store_backend,
            redis_url,
            s3,
            store_timeout: millis_env("STORE_TIMEOUT_MS", 10_000)?,
            success_dismiss: millis_env("STATUS_SUCCESS_DISMISS_MS", 2_000)?,
            error_dismiss: millis_env("STATUS_ERROR_DISMISS_MS", 3_000)?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn millis_env(key: &str, default_ms: u64) -> Result<Duration> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Duration::from_millis)
            .with_context(|| format!("{key} must be a number of milliseconds")),
        Err(_) => Ok(Duration::from_millis(default_ms)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_backend_parses_case_insensitively() {
        assert_eq!("Redis".parse::<StoreBackend>().unwrap(), StoreBackend::Redis);
        assert_eq!(" s3 ".parse::<StoreBackend>().unwrap(), StoreBackend::S3);
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
    }

    #[test]
    fn test_unknown_store_backend_rejected() {
        let err = "postgres".parse::<StoreBackend>().unwrap_err();
        assert!(err.to_string().contains("postgres"));
    }
}
