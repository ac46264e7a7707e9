//! Axum router configuration for progress endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use crate::adapters::http::state::AppState;

use super::handlers::{get_progress, get_stats, record_game_completion, record_scenario_completion};

/// Create the progress API router.
///
/// # Routes
///
/// All routes require an authenticated user.
/// - `GET /progress` - Get progress (created with defaults on first read)
/// - `POST /progress` - Record a completed game
/// - `POST /scenario-score` - Record a completed scenario
/// - `GET /stats` - Get derived statistics
pub fn progress_routes() -> Router<AppState> {
    Router::new()
        .route("/progress", get(get_progress).post(record_game_completion))
        .route("/scenario-score", post(record_scenario_completion))
        .route("/stats", get(get_stats))
}
