//! HTTP DTOs for progress endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::handlers::{
    RecordGameCompletionCommand, RecordGameCompletionResult, RecordScenarioCompletionCommand,
};
use crate::domain::foundation::{GameId, ScenarioId, UserId, ValidationError};
use crate::domain::progress::{GamePerformance, Progress, ProgressStats, ScenarioScore};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/progress body. Per-question statistics are optional; when
/// `questionsAnswered` is present they drive the streak and vigilance score.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordGameRequest {
    pub game_id: String,
    pub score: i64,
    #[serde(default)]
    pub questions_answered: Option<i64>,
    #[serde(default)]
    pub correct_answers: Option<i64>,
    #[serde(default)]
    pub hints_used: Option<i64>,
    #[serde(default)]
    pub time_spent: Option<i64>,
}

impl RecordGameRequest {
    /// Validates the payload into a command. Nothing is persisted on error.
    pub fn into_command(self, user_id: UserId) -> Result<RecordGameCompletionCommand, ValidationError> {
        let game_id = GameId::new(self.game_id)?;
        let score = non_negative("score", self.score)?;

        let performance = match self.questions_answered {
            Some(answered) => {
                let hints = non_negative("hintsUsed", self.hints_used.unwrap_or(0))?;
                let hints = u8::try_from(hints).map_err(|_| {
                    ValidationError::out_of_range("hintsUsed", 0, 3, i64::from(hints))
                })?;
                Some(GamePerformance::new(
                    non_negative("questionsAnswered", answered)?,
                    non_negative("correctAnswers", self.correct_answers.unwrap_or(0))?,
                    hints,
                    non_negative("timeSpent", self.time_spent.unwrap_or(0))?,
                )?)
            }
            None => None,
        };

        Ok(RecordGameCompletionCommand {
            user_id,
            game_id,
            score,
            performance,
        })
    }
}

/// POST /api/scenario-score body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordScenarioRequest {
    pub scenario_id: String,
    pub score: i64,
    #[serde(default)]
    pub time_spent: i64,
}

impl RecordScenarioRequest {
    pub fn into_command(self, user_id: UserId) -> Result<RecordScenarioCompletionCommand, ValidationError> {
        Ok(RecordScenarioCompletionCommand {
            user_id,
            scenario_id: ScenarioId::new(self.scenario_id)?,
            score: non_negative("score", self.score)?,
            time_spent: non_negative("timeSpent", self.time_spent)?,
        })
    }
}

fn non_negative(field: &'static str, value: i64) -> Result<u32, ValidationError> {
    u32::try_from(value).map_err(|_| ValidationError::out_of_range(field, 0, i64::from(u32::MAX), value))
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub user_id: String,
    pub level: u32,
    pub xp: u64,
    pub vigilance_score: u8,
    pub completed_scenarios: Vec<String>,
    pub completed_games: Vec<String>,
    pub badges: Vec<String>,
    pub games_played: u32,
    pub consecutive_correct: u32,
    pub last_played: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Progress> for ProgressResponse {
    fn from(progress: &Progress) -> Self {
        Self {
            user_id: progress.user_id().to_string(),
            level: progress.level(),
            xp: progress.xp(),
            vigilance_score: progress.vigilance_score().value(),
            completed_scenarios: progress.completed_scenarios().iter().map(|s| s.to_string()).collect(),
            completed_games: progress.completed_games().iter().map(|g| g.to_string()).collect(),
            badges: progress.badges().iter().map(|b| b.to_string()).collect(),
            games_played: progress.games_played(),
            consecutive_correct: progress.consecutive_correct(),
            last_played: progress.last_played().map(|t| *t.as_datetime()),
            created_at: *progress.created_at().as_datetime(),
            updated_at: *progress.updated_at().as_datetime(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameCompletionResponse {
    pub progress: ProgressResponse,
    pub xp_gained: u64,
    pub leveled_up: bool,
    pub badges_awarded: Vec<String>,
}

impl From<&RecordGameCompletionResult> for GameCompletionResponse {
    fn from(result: &RecordGameCompletionResult) -> Self {
        Self {
            progress: ProgressResponse::from(&result.progress),
            xp_gained: result.outcome.xp_gained,
            leveled_up: result.outcome.leveled_up(),
            badges_awarded: result.outcome.badges_awarded.iter().map(|b| b.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioScoreResponse {
    pub user_id: String,
    pub scenario_id: String,
    pub score: u32,
    pub time_spent: u32,
    pub completed_at: DateTime<Utc>,
}

impl From<&ScenarioScore> for ScenarioScoreResponse {
    fn from(score: &ScenarioScore) -> Self {
        Self {
            user_id: score.user_id.to_string(),
            scenario_id: score.scenario_id.to_string(),
            score: score.score,
            time_spent: score.time_spent,
            completed_at: *score.completed_at.as_datetime(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub level: u32,
    pub xp: u64,
    pub vigilance_score: u8,
    pub total_scenarios_completed: usize,
    pub total_games_played: u32,
    pub badges_count: usize,
    pub recent_scores: Vec<ScenarioScoreResponse>,
    pub average_score: f64,
    pub completion_rate: u32,
    pub streak: u32,
    pub last_played: Option<DateTime<Utc>>,
}

impl From<&ProgressStats> for StatsResponse {
    fn from(stats: &ProgressStats) -> Self {
        Self {
            level: stats.level,
            xp: stats.xp,
            vigilance_score: stats.vigilance_score.value(),
            total_scenarios_completed: stats.total_scenarios_completed,
            total_games_played: stats.total_games_played,
            badges_count: stats.badges_count,
            recent_scores: stats.recent_scores.iter().map(ScenarioScoreResponse::from).collect(),
            average_score: stats.average_score,
            completion_rate: stats.completion_rate,
            streak: stats.streak,
            last_played: stats.last_played.map(|t| *t.as_datetime()),
        }
    }
}
