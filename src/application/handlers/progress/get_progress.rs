//! GetProgress - Query handler returning a user's progress, creating it on first access.

use std::sync::Arc;

use crate::application::transaction::bounded;
use crate::application::ProgressSettings;
use crate::domain::foundation::{CommandMetadata, DomainError, Timestamp, UserId};
use crate::domain::progress::Progress;
use crate::ports::ProgressRepository;

/// Query for a user's progress record.
#[derive(Debug, Clone)]
pub struct GetProgressQuery {
    pub user_id: UserId,
}

/// Handler for reading progress.
///
/// Never fails with a not-found error: a missing record is created with
/// default values and persisted, so the next call returns the same record.
pub struct GetProgressHandler {
    repository: Arc<dyn ProgressRepository>,
    settings: ProgressSettings,
}

impl GetProgressHandler {
    pub fn new(repository: Arc<dyn ProgressRepository>, settings: ProgressSettings) -> Self {
        Self { repository, settings }
    }

    pub async fn handle(
        &self,
        query: GetProgressQuery,
        metadata: CommandMetadata,
    ) -> Result<Progress, DomainError> {
        metadata.authorize(&query.user_id)?;

        let progress = bounded(
            self.settings.transaction_timeout,
            "get progress",
            self.repository.find_or_create(&query.user_id, Timestamp::now()),
        )
        .await?;

        tracing::debug!(
            user_id = %query.user_id,
            correlation_id = %metadata.correlation_id(),
            level = progress.level(),
            "Progress loaded"
        );
        Ok(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::foundation::ErrorCode;

    fn handler(store: Arc<InMemoryStore>) -> GetProgressHandler {
        GetProgressHandler::new(store, ProgressSettings::default())
    }

    fn query(user: &str) -> GetProgressQuery {
        GetProgressQuery {
            user_id: UserId::new(user).unwrap(),
        }
    }

    #[tokio::test]
    async fn missing_progress_is_created_with_defaults() {
        let store = Arc::new(InMemoryStore::new());
        let handler = handler(store.clone());

        let progress = handler
            .handle(query("user-1"), CommandMetadata::test_fixture("user-1"))
            .await
            .unwrap();

        assert_eq!(progress.level(), 1);
        assert_eq!(progress.xp(), 0);
        assert_eq!(progress.vigilance_score().value(), 50);
        assert_eq!(progress.games_played(), 0);
        assert_eq!(progress.badges().len(), 1);
        assert_eq!(store.row_counts(&UserId::new("user-1").unwrap()).await.progress, 1);
    }

    #[tokio::test]
    async fn second_read_returns_same_record() {
        let store = Arc::new(InMemoryStore::new());
        let handler = handler(store);

        let first = handler
            .handle(query("user-1"), CommandMetadata::test_fixture("user-1"))
            .await
            .unwrap();
        let second = handler
            .handle(query("user-1"), CommandMetadata::test_fixture("user-1"))
            .await
            .unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn reading_another_users_progress_is_unauthorized() {
        let store = Arc::new(InMemoryStore::new());
        let handler = handler(store);

        let err = handler
            .handle(query("user-1"), CommandMetadata::test_fixture("intruder"))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::Unauthorized);
    }
}
