//! ProgressRepository port - write side of progress persistence.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::progress::{Progress, ScenarioScore};

/// Repository for the per-user progress record.
///
/// Every write is a single transaction: either all fields of the record (and,
/// for scenario completions, the score row) change, or none do.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Find the progress record for a user.
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Progress>, DomainError>;

    /// Return the existing record, or persist and return `Progress::new`.
    ///
    /// Registers the user row as well when it is missing. Two racing calls
    /// both observe the same persisted defaults.
    async fn find_or_create(&self, user_id: &UserId, now: Timestamp) -> Result<Progress, DomainError>;

    /// Persist a mutated record, returning its new version.
    ///
    /// # Errors
    ///
    /// - `ProgressNotFound` if no record exists for the user
    /// - `ConcurrentModification` if the stored version differs from `progress.version()`
    async fn update(&self, progress: &Progress) -> Result<u32, DomainError>;

    /// Persist a mutated record and upsert a scenario score in one transaction.
    ///
    /// The score row is keyed by `(user_id, scenario_id)`; a replay overwrites
    /// `score`, `time_spent` and `completed_at`.
    ///
    /// # Errors
    ///
    /// Same as `update`.
    async fn update_with_scenario_score(
        &self,
        progress: &Progress,
        score: &ScenarioScore,
    ) -> Result<u32, DomainError>;
}
