//! CompletionRecorder port - where finished sessions report their results.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::progress::{
    GameCompletion, GameCompletionOutcome, Progress, ScenarioCompletion, ScenarioScore,
};

/// Result of recording a finished game.
#[derive(Debug, Clone)]
pub struct GameCompletionReceipt {
    pub progress: Progress,
    pub outcome: GameCompletionOutcome,
}

/// Receives completed game and scenario sessions.
///
/// Implemented by the progress service; sessions depend only on this trait.
#[async_trait]
pub trait CompletionRecorder: Send + Sync {
    async fn record_game(
        &self,
        user_id: &UserId,
        completion: GameCompletion,
    ) -> Result<GameCompletionReceipt, DomainError>;

    async fn record_scenario(
        &self,
        user_id: &UserId,
        completion: ScenarioCompletion,
    ) -> Result<ScenarioScore, DomainError>;
}
