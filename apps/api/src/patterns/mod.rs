pub mod codec;
pub mod encryption;
pub mod handlers;
pub mod index;
pub mod models;
pub mod repository;
pub mod submission;
pub mod views;

use thiserror::Error;

use crate::patterns::encryption::EncryptError;
use crate::patterns::models::DraftError;
use crate::store::StoreError;

/// A store write that did not land.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WriteError {
    #[error("Transaction rejected by user")]
    UserDeclined,

    #[error("Submission failed: {0}")]
    BackendFailure(String),
}

impl From<StoreError> for WriteError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Rejected(_) => WriteError::UserDeclined,
            other => WriteError::BackendFailure(other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum CreateError {
    #[error(transparent)]
    InvalidDraft(#[from] DraftError),

    #[error("Encryption failed: {0}")]
    Encryption(#[from] EncryptError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

impl CreateError {
    /// Message shown in the transaction status banner.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
