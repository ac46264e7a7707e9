//! RecordScenarioCompletion - Command handler upserting a scenario score.

use std::sync::Arc;

use crate::application::transaction::{bounded, is_retryable};
use crate::application::ProgressSettings;
use crate::domain::foundation::{CommandMetadata, DomainError, ErrorCode, ScenarioId, Timestamp, UserId};
use crate::domain::progress::{ScenarioCompletion, ScenarioScore};
use crate::ports::ProgressRepository;

/// Command to record a resolved scenario.
#[derive(Debug, Clone)]
pub struct RecordScenarioCompletionCommand {
    pub user_id: UserId,
    pub scenario_id: ScenarioId,
    pub score: u32,
    pub time_spent: u32,
}

/// Handler for scenario completions.
///
/// Upserts the `(user, scenario)` score row and marks the scenario completed
/// in the same transaction. Scenario completions award no XP; a replay only
/// overwrites the score row.
pub struct RecordScenarioCompletionHandler {
    repository: Arc<dyn ProgressRepository>,
    settings: ProgressSettings,
}

impl RecordScenarioCompletionHandler {
    pub fn new(repository: Arc<dyn ProgressRepository>, settings: ProgressSettings) -> Self {
        Self { repository, settings }
    }

    pub async fn handle(
        &self,
        cmd: RecordScenarioCompletionCommand,
        metadata: CommandMetadata,
    ) -> Result<ScenarioScore, DomainError> {
        metadata.authorize(&cmd.user_id)?;

        let completion = ScenarioCompletion {
            scenario_id: cmd.scenario_id,
            score: cmd.score,
            time_spent: cmd.time_spent,
        };
        let timeout = self.settings.transaction_timeout;
        let mut attempt = 0;

        loop {
            attempt += 1;

            let mut progress = bounded(timeout, "load progress", self.repository.find_by_user(&cmd.user_id))
                .await?
                .ok_or_else(|| {
                    DomainError::new(ErrorCode::ProgressNotFound, "Progress not found")
                        .with_detail("user_id", cmd.user_id.to_string())
                })?;
            progress.authorize(&metadata.user_id)?;

            let now = Timestamp::now();
            let badges = progress.record_scenario(
                &completion.scenario_id,
                now,
                self.settings.scenario_catalog_size,
            );
            let score = ScenarioScore::from_completion(cmd.user_id.clone(), &completion, now);

            let written = bounded(
                timeout,
                "record scenario",
                self.repository.update_with_scenario_score(&progress, &score),
            )
            .await;

            match written {
                Ok(_) => {
                    tracing::info!(
                        user_id = %cmd.user_id,
                        scenario_id = %score.scenario_id,
                        score = score.score,
                        badges_awarded = badges.len(),
                        correlation_id = %metadata.correlation_id(),
                        "Scenario completion recorded"
                    );
                    return Ok(score);
                }
                Err(err) if is_retryable(&err, attempt) => {
                    tracing::warn!(
                        user_id = %cmd.user_id,
                        attempt,
                        "Progress changed concurrently, retrying scenario completion"
                    );
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::ports::ScenarioScoreReader;

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn command(scenario: &str, score: u32) -> RecordScenarioCompletionCommand {
        RecordScenarioCompletionCommand {
            user_id: user(),
            scenario_id: ScenarioId::new(scenario).unwrap(),
            score,
            time_spent: 42,
        }
    }

    async fn setup() -> (Arc<InMemoryStore>, RecordScenarioCompletionHandler) {
        let store = Arc::new(InMemoryStore::new());
        store.find_or_create(&user(), Timestamp::now()).await.unwrap();
        let handler = RecordScenarioCompletionHandler::new(store.clone(), ProgressSettings::default());
        (store, handler)
    }

    #[tokio::test]
    async fn missing_progress_is_not_found() {
        let store = Arc::new(InMemoryStore::new());
        let handler = RecordScenarioCompletionHandler::new(store, ProgressSettings::default());

        let err = handler
            .handle(command("scenario-1", 80), CommandMetadata::test_fixture("user-1"))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ProgressNotFound);
    }

    #[tokio::test]
    async fn resubmission_overwrites_the_single_row() {
        let (store, handler) = setup().await;

        handler
            .handle(command("scenario-1", 80), CommandMetadata::test_fixture("user-1"))
            .await
            .unwrap();
        let second = handler
            .handle(command("scenario-1", 95), CommandMetadata::test_fixture("user-1"))
            .await
            .unwrap();

        assert_eq!(store.count_scores(&user()).await.unwrap(), 1);
        let stored = store
            .find_score(&user(), &ScenarioId::new("scenario-1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.score, 95);
        assert_eq!(stored.completed_at, second.completed_at);
    }

    #[tokio::test]
    async fn marks_scenario_completed_without_xp() {
        let (store, handler) = setup().await;

        handler
            .handle(command("scenario-1", 100), CommandMetadata::test_fixture("user-1"))
            .await
            .unwrap();

        let progress = store.find_by_user(&user()).await.unwrap().unwrap();
        assert_eq!(progress.xp(), 0);
        assert_eq!(progress.completed_scenarios().len(), 1);
        assert!(progress.last_played().is_some());
    }

    #[tokio::test]
    async fn failed_write_leaves_no_score_row() {
        let (store, handler) = setup().await;
        store.fail_next_write_after(1).await;

        let err = handler
            .handle(command("scenario-1", 80), CommandMetadata::test_fixture("user-1"))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(store.count_scores(&user()).await.unwrap(), 0);
        let progress = store.find_by_user(&user()).await.unwrap().unwrap();
        assert!(progress.completed_scenarios().is_empty());
    }
}
