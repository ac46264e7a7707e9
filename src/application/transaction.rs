//! Bounded persistence calls.

use std::future::Future;
use std::time::Duration;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Attempts made by a write handler when its optimistic version check loses
/// a race with a concurrent writer.
pub const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Runs a persistence call, failing with `TransactionTimeout` if it does not
/// finish within `limit`.
///
/// The future is dropped on timeout, which rolls back any open transaction.
pub async fn bounded<T, F>(limit: Duration, operation: &'static str, call: F) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, timeout_ms = limit.as_millis() as u64, "Transaction timed out");
            Err(DomainError::new(
                ErrorCode::TransactionTimeout,
                format!("{} did not complete within {}ms", operation, limit.as_millis()),
            ))
        }
    }
}

/// Returns true when a failed write should be retried against fresh state.
pub fn is_retryable(err: &DomainError, attempt: u32) -> bool {
    err.code == ErrorCode::ConcurrentModification && attempt < MAX_WRITE_ATTEMPTS
}
