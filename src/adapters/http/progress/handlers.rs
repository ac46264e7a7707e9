//! HTTP handlers for progress endpoints.
//!
//! These handlers connect Axum routes to the Progress Update Service.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::response::IntoResponse;

use crate::adapters::http::auth::AuthenticatedUser;
use crate::adapters::http::error::ApiError;
use crate::adapters::http::state::AppState;

use super::dto::{
    GameCompletionResponse, ProgressResponse, RecordGameRequest, RecordScenarioRequest,
    ScenarioScoreResponse, StatsResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/progress - Current user's progress, created with defaults if missing
pub async fn get_progress(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let metadata = user.metadata();
    let progress = state
        .progress
        .get_progress(user.user_id, metadata)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(ProgressResponse::from(&progress)))
}

/// GET /api/stats - Derived statistics for the current user
pub async fn get_stats(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let metadata = user.metadata();
    let stats = state
        .progress
        .get_stats(user.user_id, metadata)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(StatsResponse::from(&stats)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/progress - Record a completed game
pub async fn record_game_completion(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    body: Result<Json<RecordGameRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body.map_err(ApiError::from_rejection)?;
    let metadata = user.metadata();
    let cmd = request
        .into_command(user.user_id)
        .map_err(|e| state.api_error(e.into()))?;

    let result = state
        .progress
        .record_game_completion(cmd, metadata)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(GameCompletionResponse::from(&result)))
}

/// POST /api/scenario-score - Record a completed scenario
pub async fn record_scenario_completion(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    body: Result<Json<RecordScenarioRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body.map_err(ApiError::from_rejection)?;
    let metadata = user.metadata();
    let cmd = request
        .into_command(user.user_id)
        .map_err(|e| state.api_error(e.into()))?;

    let score = state
        .progress
        .record_scenario_completion(cmd, metadata)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(ScenarioScoreResponse::from(&score)))
}
