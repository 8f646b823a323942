use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::patterns::codec::{decode_pattern, encode_pattern};
use crate::patterns::encryption::PatternEncryptor;
use crate::patterns::index::IndexManager;
use crate::patterns::models::{Pattern, PatternDraft};
use crate::patterns::{CreateError, WriteError};
use crate::store::RemoteStore;

const RECORD_KEY_PREFIX: &str = "pattern_";
const ID_SUFFIX_LEN: usize = 7;
const ID_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub fn record_key(id: &str) -> String {
    format!("{RECORD_KEY_PREFIX}{id}")
}

/// `{epoch-millis}-{7 random lowercase alphanumerics}`
fn generate_pattern_id() -> String {
    // The low bits of a v4 uuid are all random.
    let mut entropy = Uuid::new_v4().as_u128();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| {
            let digit = ID_ALPHABET[(entropy % 36) as usize];
            entropy /= 36;
            char::from(digit)
        })
        .collect();
    format!("{}-{suffix}", Utc::now().timestamp_millis())
}

#[derive(Debug, Clone, Serialize)]
pub struct PatternListing {
    /// Newest first.
    pub patterns: Vec<Pattern>,
    pub store_available: bool,
}

impl PatternListing {
    fn unavailable() -> Self {
        Self {
            patterns: Vec::new(),
            store_available: false,
        }
    }
}

/// Lists and creates patterns on top of a store that cannot enumerate its keys.
pub struct PatternRepository {
    store: Arc<dyn RemoteStore>,
    index: IndexManager,
    encryptor: Arc<dyn PatternEncryptor>,
}

impl PatternRepository {
    pub fn new(store: Arc<dyn RemoteStore>, encryptor: Arc<dyn PatternEncryptor>) -> Self {
        Self {
            index: IndexManager::new(store.clone()),
            store,
            encryptor,
        }
    }

    /// A probe that errors counts as unavailable.
    pub async fn is_available(&self) -> bool {
        match self.store.is_available().await {
            Ok(available) => available,
            Err(e) => {
                warn!("Store availability probe failed: {e}");
                false
            }
        }
    }

    /// Loads every indexed pattern, newest first.
    ///
    /// Never fails: an unavailable store or unreadable index yields an empty listing,
    /// and a record that is missing, unreadable or undecodable is skipped on its own.
    pub async fn list(&self) -> PatternListing {
        if !self.is_available().await {
            warn!("Pattern store is not available; returning empty listing");
            return PatternListing::unavailable();
        }

        let keys = match self.index.load_keys().await {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Failed to load pattern index: {e}");
                return PatternListing {
                    patterns: Vec::new(),
                    store_available: true,
                };
            }
        };
        debug!("Loading {} indexed patterns", keys.len());

        let mut patterns = Vec::with_capacity(keys.len());
        for key in &keys {
            let bytes = match self.store.get(&record_key(key)).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Error loading pattern {key}: {e}");
                    continue;
                }
            };
            if bytes.is_empty() {
                debug!("Indexed pattern {key} has no record; skipping");
                continue;
            }
            match decode_pattern(key, &bytes) {
                Ok(pattern) => patterns.push(pattern),
                Err(e) => warn!("Error parsing pattern data for {key}: {e}"),
            }
        }

        // Stable: equal timestamps keep index order.
        patterns.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        PatternListing {
            patterns,
            store_available: true,
        }
    }

    /// Stores a new pattern and appends it to the index, returning its id.
    ///
    /// The record is written strictly before the index. If the index append fails
    /// the record is orphaned: it exists but no listing will ever find it.
    pub async fn create(&self, owner: &str, draft: &PatternDraft) -> Result<String, CreateError> {
        let draft = draft.validate()?;
        let data = self.encryptor.encrypt(&draft)?;

        let pattern = Pattern {
            id: generate_pattern_id(),
            data,
            timestamp: Utc::now().timestamp(),
            owner: owner.to_string(),
            interaction_type: draft.interaction_type,
            intensity: draft.intensity,
        };

        let key = record_key(&pattern.id);
        self.store
            .set(&key, encode_pattern(&pattern))
            .await
            .map_err(WriteError::from)?;
        info!(
            "Stored pattern {} ({}, intensity {}) for {owner}",
            pattern.id, pattern.interaction_type, pattern.intensity
        );

        if let Err(e) = self.index.append_key(&pattern.id).await {
            warn!(
                "Pattern {} was stored but could not be indexed and is now orphaned: {e}",
                pattern.id
            );
            return Err(e.into());
        }

        Ok(pattern.id)
    }
}
