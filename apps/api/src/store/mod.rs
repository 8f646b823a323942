//! Remote store capability — the opaque key→bytes backend patterns are persisted into.
//!
//! The store has no listing, versioning or compare-and-swap primitive. A key that was
//! never written reads back as zero-length bytes, exactly like a key holding an empty
//! value; callers must treat both as "not found".

pub mod memory;
pub mod redis_store;
pub mod s3_store;
pub mod timeout;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::info;

use crate::config::{Config, StoreBackend};

pub use memory::MemoryStore;
pub use timeout::TimeoutStore;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// The authorizing party explicitly refused the write.
    #[error("user rejected transaction: {0}")]
    Rejected(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Liveness probe. Callers treat `Err` the same as `Ok(false)`.
    async fn is_available(&self) -> Result<bool, StoreError>;

    /// Returns zero-length bytes when the key is absent.
    async fn get(&self, key: &str) -> Result<Bytes, StoreError>;

    /// Either fully lands or fails; partial writes are never observable.
    async fn set(&self, key: &str, value: Bytes) -> Result<(), StoreError>;
}

/// Builds the configured store backend, wrapped in the per-call timeout.
pub async fn connect_store(config: &Config) -> Result<Arc<dyn RemoteStore>> {
    let inner: Arc<dyn RemoteStore> = match config.store_backend {
        StoreBackend::Memory => {
            info!("Using in-memory pattern store (data is lost on restart)");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Redis => {
            let url = config
                .redis_url
                .as_deref()
                .context("REDIS_URL is required for the redis store backend")?;
            let store = redis_store::RedisStore::open(url)?;
            info!("Redis pattern store initialized");
            Arc::new(store)
        }
        StoreBackend::S3 => {
            let settings = config
                .s3
                .as_ref()
                .context("S3 settings are required for the s3 store backend")?;
            let store = s3_store::S3Store::connect(settings).await;
            info!("S3 pattern store initialized (bucket: {})", settings.bucket);
            Arc::new(store)
        }
    };

    Ok(Arc::new(TimeoutStore::new(inner, config.store_timeout)))
}
