//! Row types and conversions shared by the PostgreSQL repositories.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

use crate::domain::foundation::{
    BadgeId, DomainError, ErrorCode, GameId, ScenarioId, Timestamp, UserId, VigilanceScore,
};
use crate::domain::progress::{Progress, ScenarioScore};

/// Column list matching `ProgressRow`.
pub(super) const PROGRESS_COLUMNS: &str = "user_id, xp, vigilance_score, completed_scenarios, \
     completed_games, badges, games_played, consecutive_correct, last_played, created_at, \
     updated_at, version";

/// Column list matching `ScenarioScoreRow`.
pub(super) const SCORE_COLUMNS: &str = "user_id, scenario_id, score, time_spent, completed_at";

/// Database row representation of a progress record.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct ProgressRow {
    pub user_id: String,
    pub xp: i64,
    pub vigilance_score: i16,
    pub completed_scenarios: Vec<String>,
    pub completed_games: Vec<String>,
    pub badges: Vec<String>,
    pub games_played: i32,
    pub consecutive_correct: i32,
    pub last_played: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

impl TryFrom<ProgressRow> for Progress {
    type Error = DomainError;

    fn try_from(row: ProgressRow) -> Result<Self, Self::Error> {
        let vigilance = VigilanceScore::try_new(i64::from(row.vigilance_score))
            .map_err(|e| corrupt("vigilance_score", e))?;

        Ok(Progress::reconstitute(
            UserId::new(row.user_id).map_err(|e| corrupt("user_id", e))?,
            from_db("xp", row.xp)?,
            vigilance,
            parse_set(row.completed_scenarios, ScenarioId::new, "completed_scenarios")?,
            parse_set(row.completed_games, GameId::new, "completed_games")?,
            parse_set(row.badges, BadgeId::new, "badges")?,
            from_db("games_played", row.games_played)?,
            from_db("consecutive_correct", row.consecutive_correct)?,
            row.last_played.map(Timestamp::from_datetime),
            Timestamp::from_datetime(row.created_at),
            Timestamp::from_datetime(row.updated_at),
            from_db("version", row.version)?,
        ))
    }
}

/// Database row representation of a scenario score.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct ScenarioScoreRow {
    pub user_id: String,
    pub scenario_id: String,
    pub score: i32,
    pub time_spent: i32,
    pub completed_at: DateTime<Utc>,
}

impl TryFrom<ScenarioScoreRow> for ScenarioScore {
    type Error = DomainError;

    fn try_from(row: ScenarioScoreRow) -> Result<Self, Self::Error> {
        Ok(ScenarioScore {
            user_id: UserId::new(row.user_id).map_err(|e| corrupt("user_id", e))?,
            scenario_id: ScenarioId::new(row.scenario_id).map_err(|e| corrupt("scenario_id", e))?,
            score: from_db("score", row.score)?,
            time_spent: from_db("time_spent", row.time_spent)?,
            completed_at: Timestamp::from_datetime(row.completed_at),
        })
    }
}

fn parse_set<T: Ord, E: std::fmt::Display>(
    values: Vec<String>,
    parse: impl Fn(String) -> Result<T, E>,
    column: &str,
) -> Result<BTreeSet<T>, DomainError> {
    values
        .into_iter()
        .map(|v| parse(v).map_err(|e| corrupt(column, e)))
        .collect()
}

fn corrupt(column: &str, err: impl std::fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid {} value: {}", column, err),
    )
}

/// Converts a stored column into its domain width.
pub(super) fn from_db<S, T>(column: &str, value: S) -> Result<T, DomainError>
where
    S: Copy + std::fmt::Display,
    T: TryFrom<S>,
{
    T::try_from(value).map_err(|_| corrupt(column, value))
}

/// Converts a domain value into its column width.
pub(super) fn to_db<S, T>(column: &str, value: S) -> Result<T, DomainError>
where
    S: Copy + std::fmt::Display,
    T: TryFrom<S>,
{
    T::try_from(value).map_err(|_| {
        DomainError::new(
            ErrorCode::ValidationFailed,
            format!("{} value {} does not fit in storage", column, value),
        )
    })
}

/// Maps a driver error, recognising unique violations as duplicates.
pub(super) fn storage_error(action: &str, err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return DomainError::new(ErrorCode::ConflictDuplicate, format!("Failed to {}: duplicate record", action));
        }
    }
    DomainError::database(format!("Failed to {}: {}", action, err))
}

pub(super) fn ids_to_strings<T: std::fmt::Display>(ids: &BTreeSet<T>) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}
