//! AccountRepository port - user records and cascading deletion.

use async_trait::async_trait;

use crate::domain::account::{Account, AccountDeletionReport};
use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::progress::Progress;

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Check if a user record exists.
    async fn exists(&self, user_id: &UserId) -> Result<bool, DomainError>;

    /// Insert the user record and its default progress in one transaction.
    ///
    /// # Errors
    ///
    /// - `ConflictDuplicate` if the user (or its progress) already exists
    async fn create_with_progress(&self, account: &Account, progress: &Progress) -> Result<(), DomainError>;

    /// Delete the user and every dependent row in one transaction.
    ///
    /// Scenario scores, progress, auth sessions and linked identities go
    /// first, then the user row. Any failure rolls the whole unit back.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if the user does not exist
    async fn delete_cascade(
        &self,
        user_id: &UserId,
        deleted_at: Timestamp,
    ) -> Result<AccountDeletionReport, DomainError>;
}
