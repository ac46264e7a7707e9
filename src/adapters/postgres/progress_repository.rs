//! PostgreSQL implementation of ProgressRepository and ScenarioScoreReader.
//!
//! Writes check the stored version and bump it in the same statement, so a
//! stale aggregate never overwrites a newer one.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use crate::domain::foundation::{DomainError, ErrorCode, ScenarioId, Timestamp, UserId};
use crate::domain::progress::{Progress, ScenarioScore};
use crate::ports::{ProgressRepository, ScenarioScoreReader};

use super::rows::{
    from_db, ids_to_strings, storage_error, to_db, ProgressRow, ScenarioScoreRow, PROGRESS_COLUMNS,
    SCORE_COLUMNS,
};

/// PostgreSQL implementation of the progress ports.
pub struct PostgresProgressRepository {
    pool: PgPool,
}

impl PostgresProgressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn select_progress(conn: &mut PgConnection, user_id: &UserId) -> Result<Option<Progress>, DomainError> {
    let row: Option<ProgressRow> = sqlx::query_as(&format!(
        "SELECT {} FROM progress WHERE user_id = $1",
        PROGRESS_COLUMNS
    ))
    .bind(user_id.as_str())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| storage_error("load progress", e))?;

    row.map(Progress::try_from).transpose()
}

/// Inserts a user row and a fresh progress record unless they already exist.
pub(super) async fn insert_progress(
    conn: &mut PgConnection,
    progress: &Progress,
    skip_existing: bool,
) -> Result<(), DomainError> {
    let conflict = if skip_existing { " ON CONFLICT (user_id) DO NOTHING" } else { "" };
    let sql = format!(
        "INSERT INTO progress (user_id, level, xp, vigilance_score, completed_scenarios, \
         completed_games, badges, games_played, consecutive_correct, last_played, created_at, \
         updated_at, version) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 1){}",
        conflict
    );

    sqlx::query(&sql)
        .bind(progress.user_id().as_str())
        .bind(to_db::<u32, i32>("level", progress.level())?)
        .bind(to_db::<u64, i64>("xp", progress.xp())?)
        .bind(i16::from(progress.vigilance_score().value()))
        .bind(ids_to_strings(progress.completed_scenarios()))
        .bind(ids_to_strings(progress.completed_games()))
        .bind(ids_to_strings(progress.badges()))
        .bind(to_db::<u32, i32>("games_played", progress.games_played())?)
        .bind(to_db::<u32, i32>("consecutive_correct", progress.consecutive_correct())?)
        .bind(progress.last_played().map(|t| *t.as_datetime()))
        .bind(progress.created_at().as_datetime())
        .bind(progress.updated_at().as_datetime())
        .execute(&mut *conn)
        .await
        .map_err(|e| storage_error("create progress", e))?;

    Ok(())
}

/// Writes the aggregate if its version is current, returning the new version.
async fn write_progress(conn: &mut PgConnection, progress: &Progress) -> Result<u32, DomainError> {
    let expected = to_db::<u32, i32>("version", progress.version())?;

    let new_version: Option<i32> = sqlx::query_scalar(
        r#"
        UPDATE progress SET
            level = $2,
            xp = $3,
            vigilance_score = $4,
            completed_scenarios = $5,
            completed_games = $6,
            badges = $7,
            games_played = $8,
            consecutive_correct = $9,
            last_played = $10,
            updated_at = $11,
            version = version + 1
        WHERE user_id = $1 AND version = $12
        RETURNING version
        "#,
    )
    .bind(progress.user_id().as_str())
    .bind(to_db::<u32, i32>("level", progress.level())?)
    .bind(to_db::<u64, i64>("xp", progress.xp())?)
    .bind(i16::from(progress.vigilance_score().value()))
    .bind(ids_to_strings(progress.completed_scenarios()))
    .bind(ids_to_strings(progress.completed_games()))
    .bind(ids_to_strings(progress.badges()))
    .bind(to_db::<u32, i32>("games_played", progress.games_played())?)
    .bind(to_db::<u32, i32>("consecutive_correct", progress.consecutive_correct())?)
    .bind(progress.last_played().map(|t| *t.as_datetime()))
    .bind(progress.updated_at().as_datetime())
    .bind(expected)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| storage_error("update progress", e))?;

    if let Some(version) = new_version {
        return from_db("version", version);
    }

    let actual: Option<i32> = sqlx::query_scalar("SELECT version FROM progress WHERE user_id = $1")
        .bind(progress.user_id().as_str())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| storage_error("update progress", e))?;

    match actual {
        None => Err(DomainError::new(ErrorCode::ProgressNotFound, "Progress not found")
            .with_detail("user_id", progress.user_id().to_string())),
        Some(actual) => Err(DomainError::new(
            ErrorCode::ConcurrentModification,
            "Progress was modified by another request",
        )
        .with_detail("expected_version", expected.to_string())
        .with_detail("actual_version", actual.to_string())),
    }
}

#[async_trait]
impl ProgressRepository for PostgresProgressRepository {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Progress>, DomainError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| storage_error("acquire connection", e))?;
        select_progress(&mut *conn, user_id).await
    }

    async fn find_or_create(&self, user_id: &UserId, now: Timestamp) -> Result<Progress, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("begin transaction", e))?;

        if let Some(existing) = select_progress(&mut *tx, user_id).await? {
            return Ok(existing);
        }

        sqlx::query("INSERT INTO users (id, created_at) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING")
            .bind(user_id.as_str())
            .bind(now.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_error("create user", e))?;

        insert_progress(&mut *tx, &Progress::new(user_id.clone(), now), true).await?;

        // A concurrent first read may have won the insert; read back whichever row exists.
        let progress = select_progress(&mut *tx, user_id).await?.ok_or_else(|| {
            DomainError::database("Progress row missing after insert")
                .with_detail("user_id", user_id.to_string())
        })?;

        tx.commit()
            .await
            .map_err(|e| storage_error("commit transaction", e))?;
        Ok(progress)
    }

    async fn update(&self, progress: &Progress) -> Result<u32, DomainError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| storage_error("acquire connection", e))?;
        write_progress(&mut *conn, progress).await
    }

    async fn update_with_scenario_score(
        &self,
        progress: &Progress,
        score: &ScenarioScore,
    ) -> Result<u32, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("begin transaction", e))?;

        let version = write_progress(&mut *tx, progress).await?;

        sqlx::query(
            r#"
            INSERT INTO scenario_scores (user_id, scenario_id, score, time_spent, completed_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, scenario_id) DO UPDATE SET
                score = EXCLUDED.score,
                time_spent = EXCLUDED.time_spent,
                completed_at = EXCLUDED.completed_at
            "#,
        )
        .bind(score.user_id.as_str())
        .bind(score.scenario_id.as_str())
        .bind(to_db::<u32, i32>("score", score.score)?)
        .bind(to_db::<u32, i32>("time_spent", score.time_spent)?)
        .bind(score.completed_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| storage_error("save scenario score", e))?;

        tx.commit()
            .await
            .map_err(|e| storage_error("commit transaction", e))?;
        Ok(version)
    }
}

#[async_trait]
impl ScenarioScoreReader for PostgresProgressRepository {
    async fn recent_scores(&self, user_id: &UserId, limit: usize) -> Result<Vec<ScenarioScore>, DomainError> {
        let rows: Vec<ScenarioScoreRow> = sqlx::query_as(&format!(
            "SELECT {} FROM scenario_scores WHERE user_id = $1 ORDER BY completed_at DESC LIMIT $2",
            SCORE_COLUMNS
        ))
        .bind(user_id.as_str())
        .bind(to_db::<usize, i64>("limit", limit)?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("load scenario scores", e))?;

        rows.into_iter().map(ScenarioScore::try_from).collect()
    }

    async fn find_score(
        &self,
        user_id: &UserId,
        scenario_id: &ScenarioId,
    ) -> Result<Option<ScenarioScore>, DomainError> {
        let row: Option<ScenarioScoreRow> = sqlx::query_as(&format!(
            "SELECT {} FROM scenario_scores WHERE user_id = $1 AND scenario_id = $2",
            SCORE_COLUMNS
        ))
        .bind(user_id.as_str())
        .bind(scenario_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("load scenario score", e))?;

        row.map(ScenarioScore::try_from).transpose()
    }

    async fn count_scores(&self, user_id: &UserId) -> Result<u64, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scenario_scores WHERE user_id = $1")
            .bind(user_id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error("count scenario scores", e))?;

        from_db("count", count)
    }
}
