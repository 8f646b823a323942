use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::patterns::submission::SubmitError;
use crate::patterns::{CreateError, WriteError};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Transaction rejected by user")]
    UserDeclined,

    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<SubmitError> for AppError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::MissingOwner => AppError::Validation(SubmitError::MissingOwner.to_string()),
            SubmitError::Busy(busy) => AppError::Conflict(busy.to_string()),
            SubmitError::Create(create) => create.into(),
        }
    }
}

impl From<CreateError> for AppError {
    fn from(e: CreateError) -> Self {
        match e {
            CreateError::InvalidDraft(draft) => AppError::Validation(draft.to_string()),
            CreateError::Encryption(enc) => AppError::Internal(enc.into()),
            CreateError::Write(WriteError::UserDeclined) => AppError::UserDeclined,
            CreateError::Write(WriteError::BackendFailure(msg)) => AppError::Store(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::UserDeclined => (
                StatusCode::CONFLICT,
                "USER_DECLINED",
                "Transaction rejected by user".to_string(),
            ),
            AppError::Store(msg) => {
                tracing::error!("Store error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "STORE_ERROR",
                    format!("Submission failed: {msg}"),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
