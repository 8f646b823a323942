use std::sync::Arc;

use crate::config::Config;
use crate::patterns::repository::PatternRepository;
use crate::status::TransactionStatusMachine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<PatternRepository>,
    /// Banner state for the single in-flight write; also serializes submissions.
    pub status: TransactionStatusMachine,
    pub config: Config,
}
