//! PostgreSQL implementation of AccountRepository.
//!
//! Deletion removes dependent rows explicitly, in dependency order, inside one
//! transaction so the report carries per-table counts. The cascading foreign
//! keys catch anything added later.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use crate::domain::account::{Account, AccountDeletionReport};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::progress::Progress;
use crate::ports::AccountRepository;

use super::progress_repository::insert_progress;
use super::rows::storage_error;

/// PostgreSQL implementation of the AccountRepository port.
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn delete_owned(conn: &mut PgConnection, table: &str, user_id: &UserId) -> Result<u64, DomainError> {
    let result = sqlx::query(&format!("DELETE FROM {} WHERE user_id = $1", table))
        .bind(user_id.as_str())
        .execute(&mut *conn)
        .await
        .map_err(|e| storage_error(&format!("delete {}", table), e))?;
    Ok(result.rows_affected())
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn exists(&self, user_id: &UserId) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error("check user", e))
    }

    async fn create_with_progress(&self, account: &Account, progress: &Progress) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("begin transaction", e))?;

        sqlx::query("INSERT INTO users (id, created_at) VALUES ($1, $2)")
            .bind(account.user_id.as_str())
            .bind(account.created_at.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_error("create user", e))
            .map_err(|e| e.with_detail("user_id", account.user_id.to_string()))?;

        insert_progress(&mut *tx, progress, false).await?;

        tx.commit()
            .await
            .map_err(|e| storage_error("commit transaction", e))
    }

    async fn delete_cascade(
        &self,
        user_id: &UserId,
        deleted_at: Timestamp,
    ) -> Result<AccountDeletionReport, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("begin transaction", e))?;

        let locked: Option<String> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| storage_error("lock user", e))?;
        if locked.is_none() {
            return Err(DomainError::new(ErrorCode::UserNotFound, "User not found")
                .with_detail("user_id", user_id.to_string()));
        }

        let scenario_scores = delete_owned(&mut *tx, "scenario_scores", user_id).await?;
        let progress = delete_owned(&mut *tx, "progress", user_id).await?;
        let sessions = delete_owned(&mut *tx, "auth_sessions", user_id).await?;
        let linked_identities = delete_owned(&mut *tx, "linked_identities", user_id).await?;

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_error("delete user", e))?;

        tx.commit()
            .await
            .map_err(|e| storage_error("commit transaction", e))?;

        Ok(AccountDeletionReport {
            user_id: user_id.clone(),
            scenario_scores,
            progress,
            sessions,
            linked_identities,
            deleted_at,
        })
    }
}
