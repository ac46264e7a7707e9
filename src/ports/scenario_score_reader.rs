//! ScenarioScoreReader port - read side of scenario score persistence.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ScenarioId, UserId};
use crate::domain::progress::ScenarioScore;

#[async_trait]
pub trait ScenarioScoreReader: Send + Sync {
    /// Latest scores for a user, newest `completed_at` first.
    async fn recent_scores(&self, user_id: &UserId, limit: usize) -> Result<Vec<ScenarioScore>, DomainError>;

    /// The score row for one scenario, if it was ever completed.
    async fn find_score(
        &self,
        user_id: &UserId,
        scenario_id: &ScenarioId,
    ) -> Result<Option<ScenarioScore>, DomainError>;

    /// Number of score rows stored for a user.
    async fn count_scores(&self, user_id: &UserId) -> Result<u64, DomainError>;
}
