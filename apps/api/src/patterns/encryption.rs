//! Pluggable opaque transform applied to a draft before it is stored.
//!
//! Nothing downstream looks inside the produced blob; swap the implementation held
//! in `AppState` without touching the repository or handlers.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use thiserror::Error;

use crate::patterns::models::ValidDraft;

#[derive(Debug, Error)]
pub enum EncryptError {
    #[error("could not serialize draft: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub trait PatternEncryptor: Send + Sync {
    fn encrypt(&self, draft: &ValidDraft) -> Result<String, EncryptError>;
}

/// Stand-in for homomorphic encryption: `FHE-` followed by base64 of the draft JSON.
pub struct SimulatedFheEncryptor;

pub const FHE_PREFIX: &str = "FHE-";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DraftPayload<'a> {
    interaction_type: &'a str,
    description: &'a str,
    intensity_level: u8,
}

impl PatternEncryptor for SimulatedFheEncryptor {
    fn encrypt(&self, draft: &ValidDraft) -> Result<String, EncryptError> {
        let payload = serde_json::to_vec(&DraftPayload {
            interaction_type: draft.interaction_type.as_str(),
            description: &draft.description,
            intensity_level: draft.intensity,
        })?;
        Ok(format!("{FHE_PREFIX}{}", STANDARD.encode(payload)))
    }
}
