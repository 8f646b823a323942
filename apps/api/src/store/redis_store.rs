use async_trait::async_trait;
use bytes::Bytes;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client as RedisClient};
use tokio::sync::OnceCell;
use tracing::info;

use super::{RemoteStore, StoreError};

/// Redis-backed store: one string value per key, `PING` as the liveness probe.
///
/// All calls share one multiplexed connection, opened on first use and
/// re-established by the manager after a drop. A failed first connect leaves the
/// cell empty so the next call tries again.
pub struct RedisStore {
    client: RedisClient,
    connection: OnceCell<ConnectionManager>,
}

impl RedisStore {
    /// Validates the URL only; no connection is made until the first call.
    pub fn open(url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            client: RedisClient::open(url)?,
            connection: OnceCell::new(),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, StoreError> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                let manager = self.client.get_connection_manager().await?;
                info!("Redis connection established");
                Ok::<_, redis::RedisError>(manager)
            })
            .await
            .map_err(backend_error)?;
        Ok(manager.clone())
    }
}

fn backend_error(e: redis::RedisError) -> StoreError {
    // An ACL denial is the server refusing this client, not a transport fault.
    if e.code() == Some("NOPERM") {
        return StoreError::Rejected(format!("redis: {e}"));
    }
    StoreError::Backend(format!("redis: {e}"))
}

#[async_trait]
impl RemoteStore for RedisStore {
    async fn is_available(&self) -> Result<bool, StoreError> {
        let mut conn = self.connection().await?;
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(backend_error)?;
        Ok(pong == "PONG")
    }

    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        let mut conn = self.connection().await?;
        let value: Option<Vec<u8>> = conn.get(key).await.map_err(backend_error)?;
        Ok(value.map(Bytes::from).unwrap_or_default())
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let _: () = conn
            .set(key, value.to_vec())
            .await
            .map_err(backend_error)?;
        Ok(())
    }
}
