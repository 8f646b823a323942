use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::patterns::models::{Pattern, PatternDraft};
use crate::patterns::submission::{check_availability, submit_pattern};
use crate::patterns::views::{filter_patterns, IntensityStats};
use crate::state::AppState;
use crate::status::TransactionStatus;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub search: String,
}

#[derive(Debug, Serialize)]
pub struct PatternListResponse {
    pub patterns: Vec<Pattern>,
    pub store_available: bool,
    /// Computed over the full listing, before the search filter.
    pub stats: IntensityStats,
}

#[derive(Debug, Deserialize)]
pub struct CreatePatternRequest {
    pub owner: String,
    #[serde(flatten)]
    pub draft: PatternDraft,
}

#[derive(Debug, Serialize)]
pub struct CreatePatternResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
}

#[derive(Debug, Serialize)]
pub struct DismissResponse {
    pub dismissed: bool,
    pub status: TransactionStatus,
}

/// GET /api/v1/patterns
pub async fn handle_list_patterns(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Json<PatternListResponse> {
    let listing = state.repository.list().await;
    let stats = IntensityStats::from_patterns(&listing.patterns);
    let patterns = filter_patterns(&listing.patterns, &params.search)
        .into_iter()
        .cloned()
        .collect();
    Json(PatternListResponse {
        patterns,
        store_available: listing.store_available,
        stats,
    })
}

/// POST /api/v1/patterns
pub async fn handle_create_pattern(
    State(state): State<AppState>,
    payload: Result<Json<CreatePatternRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatePatternResponse>), AppError> {
    let Json(req) = payload?;
    let id = submit_pattern(&state.repository, &state.status, &req.owner, &req.draft).await?;
    Ok((StatusCode::CREATED, Json(CreatePatternResponse { id })))
}

/// GET /api/v1/availability
pub async fn handle_availability(State(state): State<AppState>) -> Json<AvailabilityResponse> {
    let available = check_availability(&state.repository, &state.status).await;
    Json(AvailabilityResponse { available })
}

/// GET /api/v1/status
pub async fn handle_get_status(State(state): State<AppState>) -> Json<TransactionStatus> {
    Json(state.status.current())
}

/// POST /api/v1/status/dismiss
pub async fn handle_dismiss_status(State(state): State<AppState>) -> Json<DismissResponse> {
    let dismissed = state.status.dismiss();
    Json(DismissResponse {
        dismissed,
        status: state.status.current(),
    })
}
