//! GetStats - Query handler for the progress statistics view.

use std::sync::Arc;

use crate::application::transaction::bounded;
use crate::application::ProgressSettings;
use crate::domain::foundation::{CommandMetadata, DomainError, ErrorCode, UserId};
use crate::domain::progress::{ProgressStats, RECENT_SCORES_LIMIT};
use crate::ports::{ProgressRepository, ScenarioScoreReader};

/// Query for a user's statistics.
#[derive(Debug, Clone)]
pub struct GetStatsQuery {
    pub user_id: UserId,
}

/// Handler for statistics. Unlike `GetProgressHandler`, a missing record is
/// reported as not found.
pub struct GetStatsHandler {
    progress: Arc<dyn ProgressRepository>,
    scores: Arc<dyn ScenarioScoreReader>,
    settings: ProgressSettings,
}

impl GetStatsHandler {
    pub fn new(
        progress: Arc<dyn ProgressRepository>,
        scores: Arc<dyn ScenarioScoreReader>,
        settings: ProgressSettings,
    ) -> Self {
        Self {
            progress,
            scores,
            settings,
        }
    }

    pub async fn handle(
        &self,
        query: GetStatsQuery,
        metadata: CommandMetadata,
    ) -> Result<ProgressStats, DomainError> {
        metadata.authorize(&query.user_id)?;
        let timeout = self.settings.transaction_timeout;

        let progress = bounded(timeout, "load progress", self.progress.find_by_user(&query.user_id))
            .await?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::ProgressNotFound, "Progress not found")
                    .with_detail("user_id", query.user_id.to_string())
            })?;

        let recent = bounded(
            timeout,
            "load recent scores",
            self.scores.recent_scores(&query.user_id, RECENT_SCORES_LIMIT),
        )
        .await?;

        Ok(ProgressStats::compute(
            &progress,
            recent,
            self.settings.scenario_catalog_size,
        ))
    }
}
