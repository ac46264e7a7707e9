//! RecordGameCompletion - Command handler applying a finished game to progress.

use std::sync::Arc;

use crate::application::transaction::{bounded, is_retryable};
use crate::application::ProgressSettings;
use crate::domain::foundation::{CommandMetadata, DomainError, ErrorCode, GameId, Timestamp, UserId};
use crate::domain::progress::{GameCompletion, GameCompletionOutcome, GamePerformance, Progress};
use crate::ports::ProgressRepository;

/// Command to record a finished game.
#[derive(Debug, Clone)]
pub struct RecordGameCompletionCommand {
    pub user_id: UserId,
    pub game_id: GameId,
    pub score: u32,
    pub performance: Option<GamePerformance>,
}

/// Result of recording a game.
#[derive(Debug, Clone)]
pub struct RecordGameCompletionResult {
    pub progress: Progress,
    pub outcome: GameCompletionOutcome,
}

impl RecordGameCompletionResult {
    pub fn xp_gained(&self) -> u64 {
        self.outcome.xp_gained
    }
}

/// Handler for game completions.
///
/// The record must already exist. XP, level, `games_played`, the completed
/// game set, streak, vigilance, badges and `last_played` are written as one
/// versioned update; a lost version race reloads and re-applies the game.
pub struct RecordGameCompletionHandler {
    repository: Arc<dyn ProgressRepository>,
    settings: ProgressSettings,
}

impl RecordGameCompletionHandler {
    pub fn new(repository: Arc<dyn ProgressRepository>, settings: ProgressSettings) -> Self {
        Self { repository, settings }
    }

    pub async fn handle(
        &self,
        cmd: RecordGameCompletionCommand,
        metadata: CommandMetadata,
    ) -> Result<RecordGameCompletionResult, DomainError> {
        metadata.authorize(&cmd.user_id)?;

        let completion = GameCompletion {
            game_id: cmd.game_id,
            score: cmd.score,
            performance: cmd.performance,
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

            let outcome = progress.record_game(
                &completion,
                Timestamp::now(),
                self.settings.scenario_catalog_size,
            );

            match bounded(timeout, "record game", self.repository.update(&progress)).await {
                Ok(version) => {
                    progress.mark_persisted(version);
                    tracing::info!(
                        user_id = %cmd.user_id,
                        game_id = %completion.game_id,
                        score = completion.score,
                        xp_gained = outcome.xp_gained,
                        level = outcome.new_level,
                        correlation_id = %metadata.correlation_id(),
                        "Game completion recorded"
                    );
                    return Ok(RecordGameCompletionResult { progress, outcome });
                }
                Err(err) if is_retryable(&err, attempt) => {
                    tracing::warn!(
                        user_id = %cmd.user_id,
                        attempt,
                        "Progress changed concurrently, retrying game completion"
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
    use async_trait::async_trait;
    use std::sync::Mutex;

    // ════════════════════════════════════════════════════════════════════════
    // Mock that loses the first `conflicts` version races
    // ════════════════════════════════════════════════════════════════════════

    struct RacingRepository {
        progress: Mutex<Progress>,
        conflicts: Mutex<u32>,
        updates: Mutex<u32>,
    }

    impl RacingRepository {
        fn new(progress: Progress, conflicts: u32) -> Self {
            Self {
                progress: Mutex::new(progress),
                conflicts: Mutex::new(conflicts),
                updates: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl ProgressRepository for RacingRepository {
        async fn find_by_user(&self, _user_id: &UserId) -> Result<Option<Progress>, DomainError> {
            Ok(Some(self.progress.lock().unwrap().clone()))
        }

        async fn find_or_create(&self, _user_id: &UserId, _now: Timestamp) -> Result<Progress, DomainError> {
            unimplemented!()
        }

        async fn update(&self, progress: &Progress) -> Result<u32, DomainError> {
            *self.updates.lock().unwrap() += 1;
            let mut conflicts = self.conflicts.lock().unwrap();
            if *conflicts > 0 {
                *conflicts -= 1;
                return Err(DomainError::new(ErrorCode::ConcurrentModification, "stale"));
            }
            let version = progress.version() + 1;
            let mut stored = progress.clone();
            stored.mark_persisted(version);
            *self.progress.lock().unwrap() = stored;
            Ok(version)
        }

        async fn update_with_scenario_score(
            &self,
            _progress: &Progress,
            _score: &crate::domain::progress::ScenarioScore,
        ) -> Result<u32, DomainError> {
            unimplemented!()
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Helpers
    // ════════════════════════════════════════════════════════════════════════

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn command(game: &str, score: u32) -> RecordGameCompletionCommand {
        RecordGameCompletionCommand {
            user_id: user(),
            game_id: GameId::new(game).unwrap(),
            score,
            performance: None,
        }
    }

    async fn seeded_store() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store.find_or_create(&user(), Timestamp::now()).await.unwrap();
        store
    }

    // ════════════════════════════════════════════════════════════════════════
    // Tests
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn missing_progress_is_not_found() {
        let store = Arc::new(InMemoryStore::new());
        let handler = RecordGameCompletionHandler::new(store, ProgressSettings::default());

        let err = handler
            .handle(command("g1", 100), CommandMetadata::test_fixture("user-1"))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ProgressNotFound);
    }

    #[tokio::test]
    async fn applies_every_field_in_one_write() {
        let store = seeded_store().await;
        let handler = RecordGameCompletionHandler::new(store.clone(), ProgressSettings::default());

        let result = handler
            .handle(command("phish-quiz", 90), CommandMetadata::test_fixture("user-1"))
            .await
            .unwrap();

        assert_eq!(result.xp_gained(), 5);
        let stored = store.find_by_user(&user()).await.unwrap().unwrap();
        assert_eq!(stored, result.progress);
        assert_eq!(stored.xp(), 5);
        assert_eq!(stored.games_played(), 1);
        assert!(stored.last_played().is_some());
        assert!(stored.completed_games().contains(&GameId::new("phish-quiz").unwrap()));
    }

    #[tokio::test]
    async fn replaying_a_game_awards_xp_again() {
        let store = seeded_store().await;
        let handler = RecordGameCompletionHandler::new(store.clone(), ProgressSettings::default());

        for _ in 0..2 {
            handler
                .handle(command("phish-quiz", 100), CommandMetadata::test_fixture("user-1"))
                .await
                .unwrap();
        }

        let stored = store.find_by_user(&user()).await.unwrap().unwrap();
        assert_eq!(stored.xp(), 10);
        assert_eq!(stored.games_played(), 2);
        assert_eq!(stored.completed_games().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_completions_are_all_counted() {
        let store = seeded_store().await;
        let handler = Arc::new(RecordGameCompletionHandler::new(
            store.clone(),
            ProgressSettings::default(),
        ));

        let calls = (0..3).map(|i| {
            let handler = handler.clone();
            async move {
                handler
                    .handle(command(&format!("g{}", i), 100), CommandMetadata::test_fixture("user-1"))
                    .await
            }
        });
        let results = futures::future::join_all(calls).await;

        assert!(results.iter().all(|r| r.is_ok()));
        let stored = store.find_by_user(&user()).await.unwrap().unwrap();
        assert_eq!(stored.games_played(), 3);
        assert_eq!(stored.xp(), 15);
    }

    #[tokio::test]
    async fn lost_version_race_is_retried() {
        let repo = Arc::new(RacingRepository::new(Progress::new(user(), Timestamp::now()), 2));
        let handler = RecordGameCompletionHandler::new(repo.clone(), ProgressSettings::default());

        let result = handler
            .handle(command("g1", 100), CommandMetadata::test_fixture("user-1"))
            .await
            .unwrap();

        assert_eq!(result.progress.xp(), 5);
        assert_eq!(*repo.updates.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let repo = Arc::new(RacingRepository::new(Progress::new(user(), Timestamp::now()), 10));
        let handler = RecordGameCompletionHandler::new(repo.clone(), ProgressSettings::default());

        let err = handler
            .handle(command("g1", 100), CommandMetadata::test_fixture("user-1"))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ConcurrentModification);
        assert_eq!(*repo.updates.lock().unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_commit_fails_without_partial_effects() {
        let store = seeded_store().await;
        store
            .set_commit_delay(Some(std::time::Duration::from_secs(30)))
            .await;
        let handler = RecordGameCompletionHandler::new(store.clone(), ProgressSettings::default());

        let err = handler
            .handle(command("g1", 100), CommandMetadata::test_fixture("user-1"))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::TransactionTimeout);
        store.set_commit_delay(None).await;
        let stored = store.find_by_user(&user()).await.unwrap().unwrap();
        assert_eq!(stored.xp(), 0);
        assert_eq!(stored.games_played(), 0);
    }
}
