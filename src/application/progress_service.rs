//! Progress Update Service - the server boundary over the progress handlers.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, DomainError, UserId};
use crate::domain::progress::{GameCompletion, Progress, ProgressStats, ScenarioCompletion, ScenarioScore};
use crate::ports::{CompletionRecorder, GameCompletionReceipt, ProgressRepository, ScenarioScoreReader};

use super::handlers::{
    GetProgressHandler, GetProgressQuery, GetStatsHandler, GetStatsQuery,
    RecordGameCompletionCommand, RecordGameCompletionHandler, RecordGameCompletionResult,
    RecordScenarioCompletionCommand, RecordScenarioCompletionHandler,
};
use super::ProgressSettings;

/// Bundles the progress handlers behind one injectable service.
///
/// Also serves as the `CompletionRecorder` for in-process game and scenario
/// sessions, which record on behalf of the user they were opened for.
pub struct ProgressService {
    get_progress: GetProgressHandler,
    record_game: RecordGameCompletionHandler,
    record_scenario: RecordScenarioCompletionHandler,
    get_stats: GetStatsHandler,
}

impl ProgressService {
    pub fn new(
        repository: Arc<dyn ProgressRepository>,
        scores: Arc<dyn ScenarioScoreReader>,
        settings: ProgressSettings,
    ) -> Self {
        Self {
            get_progress: GetProgressHandler::new(repository.clone(), settings.clone()),
            record_game: RecordGameCompletionHandler::new(repository.clone(), settings.clone()),
            record_scenario: RecordScenarioCompletionHandler::new(repository.clone(), settings.clone()),
            get_stats: GetStatsHandler::new(repository, scores, settings),
        }
    }

    pub async fn get_progress(&self, user_id: UserId, metadata: CommandMetadata) -> Result<Progress, DomainError> {
        self.get_progress
            .handle(GetProgressQuery { user_id }, metadata)
            .await
    }

    pub async fn record_game_completion(
        &self,
        cmd: RecordGameCompletionCommand,
        metadata: CommandMetadata,
    ) -> Result<RecordGameCompletionResult, DomainError> {
        self.record_game.handle(cmd, metadata).await
    }

    pub async fn record_scenario_completion(
        &self,
        cmd: RecordScenarioCompletionCommand,
        metadata: CommandMetadata,
    ) -> Result<ScenarioScore, DomainError> {
        self.record_scenario.handle(cmd, metadata).await
    }

    pub async fn get_stats(&self, user_id: UserId, metadata: CommandMetadata) -> Result<ProgressStats, DomainError> {
        self.get_stats.handle(GetStatsQuery { user_id }, metadata).await
    }
}

#[async_trait]
impl CompletionRecorder for ProgressService {
    async fn record_game(
        &self,
        user_id: &UserId,
        completion: GameCompletion,
    ) -> Result<GameCompletionReceipt, DomainError> {
        let cmd = RecordGameCompletionCommand {
            user_id: user_id.clone(),
            game_id: completion.game_id,
            score: completion.score,
            performance: completion.performance,
        };
        let metadata = CommandMetadata::new(user_id.clone());
        let result = self.record_game.handle(cmd, metadata).await?;
        Ok(GameCompletionReceipt {
            progress: result.progress,
            outcome: result.outcome,
        })
    }

    async fn record_scenario(
        &self,
        user_id: &UserId,
        completion: ScenarioCompletion,
    ) -> Result<ScenarioScore, DomainError> {
        let cmd = RecordScenarioCompletionCommand {
            user_id: user_id.clone(),
            scenario_id: completion.scenario_id,
            score: completion.score,
            time_spent: completion.time_spent,
        };
        let metadata = CommandMetadata::new(user_id.clone());
        self.record_scenario.handle(cmd, metadata).await
    }
}
