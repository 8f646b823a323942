//! Transaction status — the ephemeral banner state for the single in-flight write.
//!
//! `idle → pending → {success, error} → idle`. Terminal states reset to idle after a
//! fixed display interval or an explicit dismiss. Observers subscribe to a `watch`
//! channel and never mutate the status themselves.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

pub const DEFAULT_SUCCESS_DISMISS: Duration = Duration::from_secs(2);
pub const DEFAULT_ERROR_DISMISS: Duration = Duration::from_secs(3);

/// Shown when a pending operation is dropped before it resolved.
pub const CANCELLED_MESSAGE: &str = "Submission failed: cancelled";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatusState {
    Idle,
    Pending,
    Success,
    Error,
}

impl StatusState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StatusState::Success | StatusState::Error)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TransactionStatus {
    pub state: StatusState,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl TransactionStatus {
    fn new(state: StatusState, message: impl Into<String>) -> Self {
        Self {
            state,
            message: message.into(),
            created_at: Utc::now(),
        }
    }

    fn idle() -> Self {
        Self::new(StatusState::Idle, "")
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatusError {
    #[error("Another submission is already in progress")]
    AlreadyPending,

    #[error("No submission is in progress")]
    NotPending,
}

/// What the current pending status belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingKind {
    /// A pattern write. Holds the slot until it resolves.
    Write,
    /// A read-only availability check. Any write replaces it.
    Check,
}

/// Cheap to clone; all clones drive the same status.
#[derive(Clone)]
pub struct TransactionStatusMachine {
    inner: Arc<Inner>,
}

struct Inner {
    tx: watch::Sender<TransactionStatus>,
    /// Bumped on every transition so a stale dismissal timer or guard cannot touch a
    /// newer status.
    epoch: AtomicU64,
    /// Only meaningful while the status is pending.
    pending_check: AtomicBool,
    success_dismiss: Duration,
    error_dismiss: Duration,
}

impl Default for TransactionStatusMachine {
    fn default() -> Self {
        Self::new(DEFAULT_SUCCESS_DISMISS, DEFAULT_ERROR_DISMISS)
    }
}

impl TransactionStatusMachine {
    pub fn new(success_dismiss: Duration, error_dismiss: Duration) -> Self {
        let (tx, _rx) = watch::channel(TransactionStatus::idle());
        Self {
            inner: Arc::new(Inner {
                tx,
                epoch: AtomicU64::new(0),
                pending_check: AtomicBool::new(false),
                success_dismiss,
                error_dismiss,
            }),
        }
    }

    pub fn current(&self) -> TransactionStatus {
        self.inner.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TransactionStatus> {
        self.inner.tx.subscribe()
    }

    /// Enters `pending` for a write, replacing any idle, terminal or check status.
    ///
    /// The returned guard is the only handle that can resolve this operation. If it
    /// is dropped unresolved the status becomes an error instead of staying pending.
    pub fn begin(&self, message: impl Into<String>) -> Result<PendingGuard, StatusError> {
        self.enter(PendingKind::Write, message.into())
    }

    /// Enters `pending` for an availability check. Refused while anything is pending.
    pub fn begin_check(&self, message: impl Into<String>) -> Result<PendingGuard, StatusError> {
        self.enter(PendingKind::Check, message.into())
    }

    /// Resets a terminal status to idle. Returns whether anything changed; a
    /// pending status cannot be dismissed.
    pub fn dismiss(&self) -> bool {
        self.inner.tx.send_if_modified(|status| {
            if !status.state.is_terminal() {
                return false;
            }
            self.inner.epoch.fetch_add(1, Ordering::SeqCst);
            *status = TransactionStatus::idle();
            true
        })
    }

    fn enter(&self, kind: PendingKind, message: String) -> Result<PendingGuard, StatusError> {
        let mut entered = Err(StatusError::AlreadyPending);
        self.inner.tx.send_if_modified(|status| {
            if status.state == StatusState::Pending {
                let replaceable = kind == PendingKind::Write
                    && self.inner.pending_check.load(Ordering::SeqCst);
                if !replaceable {
                    return false;
                }
                debug!("Write replaces pending check \"{}\"", status.message);
            }
            let epoch = self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1;
            self.inner
                .pending_check
                .store(kind == PendingKind::Check, Ordering::SeqCst);
            *status = TransactionStatus::new(StatusState::Pending, message);
            entered = Ok(epoch);
            true
        });
        let epoch = entered?;
        Ok(PendingGuard {
            machine: self.clone(),
            epoch,
            kind,
            resolved: false,
        })
    }

    /// Resolves the pending status entered at `epoch`, if it is still the current one.
    fn resolve(
        &self,
        epoch: u64,
        state: StatusState,
        message: String,
        display_for: Duration,
    ) -> Result<(), StatusError> {
        let mut resolved = None;
        self.inner.tx.send_if_modified(|status| {
            if status.state != StatusState::Pending
                || self.inner.epoch.load(Ordering::SeqCst) != epoch
            {
                return false;
            }
            resolved = Some(self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1);
            *status = TransactionStatus::new(state, message);
            true
        });
        let resolved = resolved.ok_or(StatusError::NotPending)?;
        self.schedule_dismiss(resolved, display_for);
        Ok(())
    }

    fn schedule_dismiss(&self, epoch: u64, after: Duration) {
        // A guard dropped during runtime shutdown has nowhere to run a timer.
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No runtime to dismiss transaction status; it stays until dismissed");
            return;
        };
        let inner = Arc::clone(&self.inner);
        runtime.spawn(async move {
            tokio::time::sleep(after).await;
            let fired = inner.tx.send_if_modified(|status| {
                if inner.epoch.load(Ordering::SeqCst) != epoch || !status.state.is_terminal() {
                    return false;
                }
                *status = TransactionStatus::idle();
                true
            });
            if fired {
                debug!("Transaction status auto-dismissed after {after:?}");
            }
        });
    }
}

/// Exclusive right to resolve one pending status.
///
/// Dropping it unresolved resolves the status to [`CANCELLED_MESSAGE`], so a caller
/// that is cancelled mid-flight cannot leave the machine stuck in `pending`.
#[must_use = "dropping the guard resolves the status as cancelled"]
pub struct PendingGuard {
    machine: TransactionStatusMachine,
    epoch: u64,
    kind: PendingKind,
    resolved: bool,
}

impl PendingGuard {
    /// Fails with `NotPending` if another operation has since replaced this one.
    pub fn resolve_success(mut self, message: impl Into<String>) -> Result<(), StatusError> {
        self.resolved = true;
        let display_for = self.machine.inner.success_dismiss;
        self.machine
            .resolve(self.epoch, StatusState::Success, message.into(), display_for)
    }

    pub fn resolve_error(mut self, message: impl Into<String>) -> Result<(), StatusError> {
        self.resolved = true;
        let display_for = self.machine.inner.error_dismiss;
        self.machine
            .resolve(self.epoch, StatusState::Error, message.into(), display_for)
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if self.resolved {
            return;
        }
        let display_for = self.machine.inner.error_dismiss;
        if self
            .machine
            .resolve(
                self.epoch,
                StatusState::Error,
                CANCELLED_MESSAGE.to_string(),
                display_for,
            )
            .is_ok()
        {
            warn!("{:?} operation was dropped while pending", self.kind);
        }
    }
}
