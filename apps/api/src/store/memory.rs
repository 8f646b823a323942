use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use super::{RemoteStore, StoreError};

/// Process-local store. Backs the `memory` backend and every test in the crate.
#[derive(Debug)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Bytes>>,
    available: AtomicBool,
    failing_writes: Mutex<HashMap<String, StoreError>>,
    failing_reads: Mutex<HashMap<String, StoreError>>,
    /// Calls on these keys never complete.
    stalled: Mutex<HashSet<String>>,
    stalled_probe: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
            failing_writes: Mutex::new(HashMap::new()),
            failing_reads: Mutex::new(HashMap::new()),
            stalled: Mutex::new(HashSet::new()),
            stalled_probe: AtomicBool::new(false),
        }
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, Bytes>> {
        // A poisoned map still holds consistent whole values.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn failing_writes(&self) -> std::sync::MutexGuard<'_, HashMap<String, StoreError>> {
        self.failing_writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    fn failing_reads(&self) -> std::sync::MutexGuard<'_, HashMap<String, StoreError>> {
        self.failing_reads.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn stalled(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.stalled.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn stall_if_held(&self, key: &str) {
        let held = self.stalled().contains(key);
        if held {
            std::future::pending::<()>().await;
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl MemoryStore {
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Every subsequent `set` on `key` fails with `error`.
    pub fn fail_writes_to(&self, key: &str, error: StoreError) {
        self.failing_writes().insert(key.to_string(), error);
    }

    /// Every subsequent `get` on `key` fails with `error`.
    pub fn fail_reads_from(&self, key: &str, error: StoreError) {
        self.failing_reads().insert(key.to_string(), error);
    }

    /// `get` and `set` on `key` hang until [`MemoryStore::release`] is called.
    /// Calls already hanging stay hung.
    pub fn stall(&self, key: &str) {
        self.stalled().insert(key.to_string());
    }

    pub fn release(&self, key: &str) {
        self.stalled().remove(key);
    }

    /// `is_available` hangs while set.
    pub fn stall_probe(&self, stalled: bool) {
        self.stalled_probe.store(stalled, Ordering::SeqCst);
    }

    pub fn put_raw(&self, key: &str, value: impl Into<Bytes>) {
        self.entries().insert(key.to_string(), value.into());
    }

    pub fn raw(&self, key: &str) -> Option<Bytes> {
        self.entries().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn is_available(&self) -> Result<bool, StoreError> {
        if self.stalled_probe.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        Ok(self.available.load(Ordering::SeqCst))
    }

    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        self.stall_if_held(key).await;
        if let Some(err) = self.failing_reads().get(key) {
            return Err(err.clone());
        }
        Ok(self.entries().get(key).cloned().unwrap_or_default())
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        self.stall_if_held(key).await;
        if let Some(err) = self.failing_writes().get(key) {
            return Err(err.clone());
        }
        self.entries().insert(key.to_string(), value);
        Ok(())
    }
}
