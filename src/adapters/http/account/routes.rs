//! Axum router configuration for account endpoints.

use axum::{routing::post, Router};

use crate::adapters::http::state::AppState;

use super::handlers::{create_account, delete_account};

/// Create the account API router.
///
/// # Routes
/// - `POST /account` - Create the caller's account and progress
/// - `POST /delete-account` - Delete the caller's account and all owned data
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/account", post(create_account))
        .route("/delete-account", post(delete_account))
}
