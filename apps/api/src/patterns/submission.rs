//! Drives the transaction status around pattern writes and availability checks.

use thiserror::Error;
use tracing::{debug, warn};

use crate::patterns::models::PatternDraft;
use crate::patterns::repository::PatternRepository;
use crate::patterns::CreateError;
use crate::status::{StatusError, TransactionStatusMachine};

pub const ENCRYPTING_MESSAGE: &str = "Encrypting pattern data with FHE...";
pub const SUBMITTED_MESSAGE: &str = "Encrypted pattern submitted securely!";
pub const CHECKING_MESSAGE: &str = "Checking FHE availability...";
pub const AVAILABLE_MESSAGE: &str = "FHE system is available and ready!";
pub const UNAVAILABLE_MESSAGE: &str = "FHE system is currently unavailable";

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Please connect wallet first")]
    MissingOwner,

    #[error(transparent)]
    Busy(#[from] StatusError),

    #[error(transparent)]
    Create(#[from] CreateError),
}

/// Validates, then creates the pattern while reflecting progress in `status`.
///
/// Invalid input is refused without touching the status. Only one submission may
/// be pending at a time; a second one fails with `StatusError::AlreadyPending`.
/// A pending availability check is replaced. If this future is dropped before the
/// write finishes, the status resolves to an error rather than staying pending.
pub async fn submit_pattern(
    repo: &PatternRepository,
    status: &TransactionStatusMachine,
    owner: &str,
    draft: &PatternDraft,
) -> Result<String, SubmitError> {
    if owner.trim().is_empty() {
        return Err(SubmitError::MissingOwner);
    }
    draft.validate().map_err(CreateError::from)?;

    let pending = status.begin(ENCRYPTING_MESSAGE)?;

    let outcome = repo.create(owner, draft).await;
    let resolved = match &outcome {
        Ok(_) => pending.resolve_success(SUBMITTED_MESSAGE),
        Err(e) => pending.resolve_error(e.user_message()),
    };
    if let Err(e) = resolved {
        warn!("Could not resolve submission status: {e}");
    }

    Ok(outcome?)
}

/// Probes the store and reports the result as a status banner.
///
/// The check never blocks a write: it is skipped while a submission is pending, and
/// a submission that starts mid-check takes over the status.
pub async fn check_availability(
    repo: &PatternRepository,
    status: &TransactionStatusMachine,
) -> bool {
    let pending = status.begin_check(CHECKING_MESSAGE).ok();
    let available = repo.is_available().await;
    if let Some(pending) = pending {
        let message = if available {
            AVAILABLE_MESSAGE
        } else {
            UNAVAILABLE_MESSAGE
        };
        if pending.resolve_success(message).is_err() {
            debug!("Availability result not shown; a submission took over the status");
        }
    }
    available
}
