use std::sync::Arc;

use tracing::info;

use crate::patterns::codec::{decode_index, encode_index};
use crate::patterns::WriteError;
use crate::store::{RemoteStore, StoreError};

/// Well-known key whose payload lists every pattern id.
pub const INDEX_KEY: &str = "pattern_keys";

/// Owns the index key that stands in for the store's missing listing primitive.
///
/// `append_key` is a read-modify-write of the whole list with no concurrency
/// control. Two concurrent appends both read the same list and the later `set`
/// wins, so one id is silently dropped from the index. Its record still exists
/// but is never listed.
#[derive(Clone)]
pub struct IndexManager {
    store: Arc<dyn RemoteStore>,
}

impl IndexManager {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// Current ids in insertion order. A zero-length or undecodable index reads as
    /// empty; only a failure of the store call itself is an error.
    pub async fn load_keys(&self) -> Result<Vec<String>, StoreError> {
        let bytes = self.store.get(INDEX_KEY).await?;
        Ok(decode_index(&bytes))
    }

    /// Appends `id` to the end of the index. Duplicates are not filtered.
    pub async fn append_key(&self, id: &str) -> Result<(), WriteError> {
        let mut keys = self.load_keys().await?;
        keys.push(id.to_string());
        self.store.set(INDEX_KEY, encode_index(&keys)).await?;
        info!("Appended {id} to index ({} keys)", keys.len());
        Ok(())
    }
}
