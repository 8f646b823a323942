use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::warn;

use super::{RemoteStore, StoreError};

/// Bounds every call on the wrapped store. The underlying request is dropped on
/// timeout; a write that already reached the backend may still land.
pub struct TimeoutStore {
    inner: Arc<dyn RemoteStore>,
    timeout: Duration,
}

impl TimeoutStore {
    pub fn new(inner: Arc<dyn RemoteStore>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(
        &self,
        op: &str,
        key: &str,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Store {op} on '{key}' timed out after {:?}", self.timeout);
                Err(StoreError::Timeout(self.timeout))
            }
        }
    }
}

#[async_trait]
impl RemoteStore for TimeoutStore {
    async fn is_available(&self) -> Result<bool, StoreError> {
        self.bounded("probe", "-", self.inner.is_available()).await
    }

    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        self.bounded("get", key, self.inner.get(key)).await
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        self.bounded("set", key, self.inner.set(key, value)).await
    }
}
