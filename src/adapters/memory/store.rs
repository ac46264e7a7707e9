//! In-memory transactional store implementing every persistence port.
//!
//! Each write runs against a private copy of the tables while holding the
//! store lock, and the copy replaces the live tables only when the whole
//! transaction succeeded. Dropping a write future before it finishes (e.g.
//! on timeout) therefore leaves the store untouched.
//!
//! Two faults can be injected to exercise failure paths:
//! - `fail_next_write_after(n)` makes the next transaction fail after `n` write steps
//! - `set_commit_delay(d)` sleeps for `d` before every commit

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::domain::account::{Account, AccountDeletionReport};
use crate::domain::foundation::{DomainError, ErrorCode, ScenarioId, Timestamp, UserId};
use crate::domain::progress::{Progress, ScenarioScore};
use crate::ports::{AccountRepository, ProgressRepository, ScenarioScoreReader};

#[derive(Debug, Clone)]
struct AuthSessionRow {
    user_id: UserId,
    #[allow(dead_code)]
    session_id: String,
}

#[derive(Debug, Clone)]
struct LinkedIdentityRow {
    user_id: UserId,
    #[allow(dead_code)]
    provider: String,
    #[allow(dead_code)]
    subject: String,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    users: BTreeMap<UserId, Account>,
    auth_sessions: Vec<AuthSessionRow>,
    linked_identities: Vec<LinkedIdentityRow>,
    progress: BTreeMap<UserId, Progress>,
    scenario_scores: BTreeMap<(UserId, ScenarioId), ScenarioScore>,
}

#[derive(Debug, Default)]
struct Faults {
    fail_after_writes: Option<usize>,
    commit_delay: Option<Duration>,
}

#[derive(Debug, Default)]
struct Inner {
    tables: Tables,
    faults: Faults,
}

/// Rows stored for one user, per table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowCounts {
    pub users: usize,
    pub progress: usize,
    pub scenario_scores: usize,
    pub sessions: usize,
    pub linked_identities: usize,
}

impl RowCounts {
    pub fn is_empty(&self) -> bool {
        *self == RowCounts::default()
    }
}

/// A transaction in progress: a working copy plus the write-step counter.
struct Transaction {
    tables: Tables,
    writes: usize,
    fail_after: Option<usize>,
}

impl Transaction {
    fn step(&mut self, what: &str) -> Result<(), DomainError> {
        if self.fail_after == Some(self.writes) {
            return Err(DomainError::database(format!(
                "Injected failure before {}",
                what
            )));
        }
        self.writes += 1;
        Ok(())
    }

    fn write_progress(&mut self, progress: &Progress) -> Result<u32, DomainError> {
        let stored_version = self
            .tables
            .progress
            .get(progress.user_id())
            .map(Progress::version)
            .ok_or_else(|| progress_not_found(progress.user_id()))?;

        if stored_version != progress.version() {
            return Err(DomainError::new(
                ErrorCode::ConcurrentModification,
                "Progress was modified by another request",
            )
            .with_detail("expected_version", progress.version().to_string())
            .with_detail("actual_version", stored_version.to_string()));
        }

        self.step("progress update")?;
        let version = stored_version + 1;
        let mut updated = progress.clone();
        updated.mark_persisted(version);
        self.tables.progress.insert(progress.user_id().clone(), updated);
        Ok(version)
    }
}

/// Thread-safe in-memory store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // === Fault Injection ===

    /// Makes the next write transaction fail after `writes` write steps.
    pub async fn fail_next_write_after(&self, writes: usize) {
        self.inner.lock().await.faults.fail_after_writes = Some(writes);
    }

    /// Delays every commit by `delay` (`None` to clear).
    pub async fn set_commit_delay(&self, delay: Option<Duration>) {
        self.inner.lock().await.faults.commit_delay = delay;
    }

    // === Seeding and Inspection ===

    /// Stores an authentication session row owned by `user_id`.
    pub async fn seed_auth_session(&self, user_id: &UserId, session_id: impl Into<String>) {
        self.inner.lock().await.tables.auth_sessions.push(AuthSessionRow {
            user_id: user_id.clone(),
            session_id: session_id.into(),
        });
    }

    /// Stores a linked external identity owned by `user_id`.
    pub async fn seed_linked_identity(
        &self,
        user_id: &UserId,
        provider: impl Into<String>,
        subject: impl Into<String>,
    ) {
        self.inner
            .lock()
            .await
            .tables
            .linked_identities
            .push(LinkedIdentityRow {
                user_id: user_id.clone(),
                provider: provider.into(),
                subject: subject.into(),
            });
    }

    /// Counts the rows stored for `user_id` in every table.
    pub async fn row_counts(&self, user_id: &UserId) -> RowCounts {
        let inner = self.inner.lock().await;
        let tables = &inner.tables;
        RowCounts {
            users: usize::from(tables.users.contains_key(user_id)),
            progress: usize::from(tables.progress.contains_key(user_id)),
            scenario_scores: tables
                .scenario_scores
                .keys()
                .filter(|(owner, _)| owner == user_id)
                .count(),
            sessions: tables
                .auth_sessions
                .iter()
                .filter(|row| &row.user_id == user_id)
                .count(),
            linked_identities: tables
                .linked_identities
                .iter()
                .filter(|row| &row.user_id == user_id)
                .count(),
        }
    }

    async fn transact<T: Send>(
        &self,
        body: impl FnOnce(&mut Transaction) -> Result<T, DomainError> + Send,
    ) -> Result<T, DomainError> {
        let mut inner = self.inner.lock().await;
        let mut tx = Transaction {
            tables: inner.tables.clone(),
            writes: 0,
            fail_after: inner.faults.fail_after_writes.take(),
        };

        let value = body(&mut tx)?;

        if let Some(delay) = inner.faults.commit_delay {
            tokio::time::sleep(delay).await;
        }
        inner.tables = tx.tables;
        Ok(value)
    }
}

fn progress_not_found(user_id: &UserId) -> DomainError {
    DomainError::new(ErrorCode::ProgressNotFound, "Progress not found")
        .with_detail("user_id", user_id.to_string())
}

#[async_trait]
impl ProgressRepository for InMemoryStore {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Progress>, DomainError> {
        Ok(self.inner.lock().await.tables.progress.get(user_id).cloned())
    }

    async fn find_or_create(&self, user_id: &UserId, now: Timestamp) -> Result<Progress, DomainError> {
        let user_id = user_id.clone();
        self.transact(move |tx| {
            if let Some(existing) = tx.tables.progress.get(&user_id) {
                return Ok(existing.clone());
            }
            if !tx.tables.users.contains_key(&user_id) {
                tx.step("user insert")?;
                tx.tables
                    .users
                    .insert(user_id.clone(), Account::new(user_id.clone(), now));
            }
            tx.step("progress insert")?;
            let mut progress = Progress::new(user_id.clone(), now);
            progress.mark_persisted(1);
            tx.tables.progress.insert(user_id, progress.clone());
            Ok(progress)
        })
        .await
    }

    async fn update(&self, progress: &Progress) -> Result<u32, DomainError> {
        let progress = progress.clone();
        self.transact(move |tx| tx.write_progress(&progress)).await
    }

    async fn update_with_scenario_score(
        &self,
        progress: &Progress,
        score: &ScenarioScore,
    ) -> Result<u32, DomainError> {
        let progress = progress.clone();
        let score = score.clone();
        self.transact(move |tx| {
            let version = tx.write_progress(&progress)?;
            tx.step("scenario score upsert")?;
            tx.tables
                .scenario_scores
                .insert((score.user_id.clone(), score.scenario_id.clone()), score);
            Ok(version)
        })
        .await
    }
}

#[async_trait]
impl ScenarioScoreReader for InMemoryStore {
    async fn recent_scores(&self, user_id: &UserId, limit: usize) -> Result<Vec<ScenarioScore>, DomainError> {
        let inner = self.inner.lock().await;
        let mut scores: Vec<ScenarioScore> = inner
            .tables
            .scenario_scores
            .values()
            .filter(|s| &s.user_id == user_id)
            .cloned()
            .collect();
        scores.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        scores.truncate(limit);
        Ok(scores)
    }

    async fn find_score(
        &self,
        user_id: &UserId,
        scenario_id: &ScenarioId,
    ) -> Result<Option<ScenarioScore>, DomainError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tables
            .scenario_scores
            .get(&(user_id.clone(), scenario_id.clone()))
            .cloned())
    }

    async fn count_scores(&self, user_id: &UserId) -> Result<u64, DomainError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tables
            .scenario_scores
            .keys()
            .filter(|(owner, _)| owner == user_id)
            .count() as u64)
    }
}

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn exists(&self, user_id: &UserId) -> Result<bool, DomainError> {
        Ok(self.inner.lock().await.tables.users.contains_key(user_id))
    }

    async fn create_with_progress(&self, account: &Account, progress: &Progress) -> Result<(), DomainError> {
        let account = account.clone();
        let progress = progress.clone();
        self.transact(move |tx| {
            let user_id = account.user_id.clone();
            if tx.tables.users.contains_key(&user_id) || tx.tables.progress.contains_key(&user_id) {
                return Err(DomainError::new(
                    ErrorCode::ConflictDuplicate,
                    "Account already exists",
                )
                .with_detail("user_id", user_id.to_string()));
            }
            tx.step("user insert")?;
            tx.tables.users.insert(user_id.clone(), account);
            tx.step("progress insert")?;
            let mut progress = progress;
            progress.mark_persisted(1);
            tx.tables.progress.insert(user_id, progress);
            Ok(())
        })
        .await
    }

    async fn delete_cascade(
        &self,
        user_id: &UserId,
        deleted_at: Timestamp,
    ) -> Result<AccountDeletionReport, DomainError> {
        let user_id = user_id.clone();
        self.transact(move |tx| {
            if !tx.tables.users.contains_key(&user_id) {
                return Err(DomainError::new(ErrorCode::UserNotFound, "User not found")
                    .with_detail("user_id", user_id.to_string()));
            }

            tx.step("scenario score delete")?;
            let before = tx.tables.scenario_scores.len();
            tx.tables.scenario_scores.retain(|(owner, _), _| owner != &user_id);
            let scenario_scores = (before - tx.tables.scenario_scores.len()) as u64;

            tx.step("progress delete")?;
            let progress = u64::from(tx.tables.progress.remove(&user_id).is_some());

            tx.step("session delete")?;
            let before = tx.tables.auth_sessions.len();
            tx.tables.auth_sessions.retain(|row| row.user_id != user_id);
            let sessions = (before - tx.tables.auth_sessions.len()) as u64;

            tx.step("linked identity delete")?;
            let before = tx.tables.linked_identities.len();
            tx.tables.linked_identities.retain(|row| row.user_id != user_id);
            let linked_identities = (before - tx.tables.linked_identities.len()) as u64;

            tx.step("user delete")?;
            tx.tables.users.remove(&user_id);

            Ok(AccountDeletionReport {
                user_id,
                scenario_scores,
                progress,
                sessions,
                linked_identities,
                deleted_at,
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::GameId;
    use crate::domain::progress::GameCompletion;

    const CATALOG: usize = 10;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn score(user_id: &UserId, scenario: &str, value: u32, at: Timestamp) -> ScenarioScore {
        ScenarioScore {
            user_id: user_id.clone(),
            scenario_id: ScenarioId::new(scenario).unwrap(),
            score: value,
            time_spent: 20,
            completed_at: at,
        }
    }

    #[tokio::test]
    async fn find_or_create_persists_defaults_once() {
        let store = InMemoryStore::new();
        let id = user("user-1");

        let first = store.find_or_create(&id, Timestamp::now()).await.unwrap();
        let second = store.find_or_create(&id, Timestamp::now()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.version(), 1);
        assert!(store.exists(&id).await.unwrap());
    }

    #[tokio::test]
    async fn update_bumps_version() {
        let store = InMemoryStore::new();
        let id = user("user-1");
        let mut progress = store.find_or_create(&id, Timestamp::now()).await.unwrap();

        progress.adjust_vigilance(5);
        let version = store.update(&progress).await.unwrap();

        assert_eq!(version, 2);
        let stored = store.find_by_user(&id).await.unwrap().unwrap();
        assert_eq!(stored.vigilance_score().value(), 55);
        assert_eq!(stored.version(), 2);
    }

    #[tokio::test]
    async fn stale_update_is_rejected() {
        let store = InMemoryStore::new();
        let id = user("user-1");
        let stale = store.find_or_create(&id, Timestamp::now()).await.unwrap();

        let mut fresh = stale.clone();
        fresh.record_game(
            &GameCompletion {
                game_id: GameId::new("g1").unwrap(),
                score: 100,
                performance: None,
            },
            Timestamp::now(),
            CATALOG,
        );
        store.update(&fresh).await.unwrap();

        let err = store.update(&stale).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConcurrentModification);
        assert_eq!(store.find_by_user(&id).await.unwrap().unwrap().xp(), 5);
    }

    #[tokio::test]
    async fn update_without_record_is_not_found() {
        let store = InMemoryStore::new();
        let progress = Progress::new(user("ghost"), Timestamp::now());
        let err = store.update(&progress).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ProgressNotFound);
    }

    #[tokio::test]
    async fn scenario_score_upsert_keeps_one_row() {
        let store = InMemoryStore::new();
        let id = user("user-1");
        let progress = store.find_or_create(&id, Timestamp::now()).await.unwrap();
        let t0 = Timestamp::now();

        store
            .update_with_scenario_score(&progress, &score(&id, "scenario-1", 80, t0))
            .await
            .unwrap();
        let progress = store.find_by_user(&id).await.unwrap().unwrap();
        store
            .update_with_scenario_score(&progress, &score(&id, "scenario-1", 95, t0.plus_secs(5)))
            .await
            .unwrap();

        assert_eq!(store.count_scores(&id).await.unwrap(), 1);
        let stored = store
            .find_score(&id, &ScenarioId::new("scenario-1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.score, 95);
        assert_eq!(stored.completed_at, t0.plus_secs(5));
    }

    #[tokio::test]
    async fn recent_scores_are_newest_first() {
        let store = InMemoryStore::new();
        let id = user("user-1");
        let t0 = Timestamp::now();
        for (i, name) in ["a", "b", "c"].iter().enumerate() {
            let progress = store.find_or_create(&id, t0).await.unwrap();
            store
                .update_with_scenario_score(&progress, &score(&id, name, 50, t0.plus_secs(i as i64)))
                .await
                .unwrap();
        }

        let recent = store.recent_scores(&id, 2).await.unwrap();

        let names: Vec<_> = recent.iter().map(|s| s.scenario_id.as_str()).collect();
        assert_eq!(names, vec!["c", "b"]);
    }

    #[tokio::test]
    async fn create_with_progress_rejects_duplicates() {
        let store = InMemoryStore::new();
        let id = user("user-1");
        let now = Timestamp::now();
        let account = Account::new(id.clone(), now);
        let progress = Progress::new(id.clone(), now);

        store.create_with_progress(&account, &progress).await.unwrap();
        let err = store.create_with_progress(&account, &progress).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ConflictDuplicate);
    }

    #[tokio::test]
    async fn delete_cascade_removes_every_row() {
        let store = InMemoryStore::new();
        let id = user("user-1");
        let other = user("user-2");
        let progress = store.find_or_create(&id, Timestamp::now()).await.unwrap();
        store.find_or_create(&other, Timestamp::now()).await.unwrap();
        store
            .update_with_scenario_score(&progress, &score(&id, "s1", 80, Timestamp::now()))
            .await
            .unwrap();
        store.seed_auth_session(&id, "sess-1").await;
        store.seed_linked_identity(&id, "google", "sub-1").await;

        let report = store.delete_cascade(&id, Timestamp::now()).await.unwrap();

        assert_eq!(report.scenario_scores, 1);
        assert_eq!(report.progress, 1);
        assert_eq!(report.sessions, 1);
        assert_eq!(report.linked_identities, 1);
        assert!(store.row_counts(&id).await.is_empty());
        assert_eq!(store.row_counts(&other).await.progress, 1);
    }

    #[tokio::test]
    async fn injected_failure_rolls_back_partial_delete() {
        let store = InMemoryStore::new();
        let id = user("user-1");
        let progress = store.find_or_create(&id, Timestamp::now()).await.unwrap();
        store
            .update_with_scenario_score(&progress, &score(&id, "s1", 80, Timestamp::now()))
            .await
            .unwrap();
        store.seed_auth_session(&id, "sess-1").await;
        let before = store.row_counts(&id).await;

        store.fail_next_write_after(3).await;
        let err = store.delete_cascade(&id, Timestamp::now()).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(store.row_counts(&id).await, before);

        // fault is one-shot
        assert!(store.delete_cascade(&id, Timestamp::now()).await.is_ok());
    }

    #[tokio::test]
    async fn delete_unknown_user_is_not_found() {
        let store = InMemoryStore::new();
        let err = store
            .delete_cascade(&user("ghost"), Timestamp::now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_commit_leaves_store_untouched() {
        let store = InMemoryStore::new();
        let id = user("user-1");
        let mut progress = store.find_or_create(&id, Timestamp::now()).await.unwrap();
        store.set_commit_delay(Some(Duration::from_secs(10))).await;

        progress.adjust_vigilance(10);
        let result = tokio::time::timeout(Duration::from_secs(1), store.update(&progress)).await;

        assert!(result.is_err());
        store.set_commit_delay(None).await;
        let stored = store.find_by_user(&id).await.unwrap().unwrap();
        assert_eq!(stored.vigilance_score().value(), 50);
        assert_eq!(stored.version(), 1);
    }
}
