//! HTTP handlers for account lifecycle endpoints.

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::http::auth::AuthenticatedUser;
use crate::adapters::http::error::ApiError;
use crate::adapters::http::progress::dto::ProgressResponse;
use crate::adapters::http::state::AppState;

use super::dto::DeleteAccountResponse;

/// POST /api/account - Register the caller with initial progress
pub async fn create_account(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let metadata = user.metadata();
    let progress = state
        .accounts
        .create_account(user.user_id, metadata)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok((StatusCode::CREATED, Json(ProgressResponse::from(&progress))))
}

/// POST /api/delete-account - Remove the caller and everything they own
pub async fn delete_account(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let metadata = user.metadata();
    let report = state
        .accounts
        .delete_account(user.user_id, metadata)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(DeleteAccountResponse::from(&report)))
}
