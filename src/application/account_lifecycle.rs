//! Account Lifecycle Coordinator.

use std::sync::Arc;

use crate::domain::account::AccountDeletionReport;
use crate::domain::foundation::{CommandMetadata, DomainError, UserId};
use crate::domain::progress::Progress;
use crate::ports::AccountRepository;

use super::handlers::{CreateAccountCommand, CreateAccountHandler, DeleteAccountCommand, DeleteAccountHandler};
use super::ProgressSettings;

/// Creates accounts with their progress and deletes them with everything they own.
pub struct AccountLifecycle {
    create: CreateAccountHandler,
    delete: DeleteAccountHandler,
}

impl AccountLifecycle {
    pub fn new(repository: Arc<dyn AccountRepository>, settings: ProgressSettings) -> Self {
        Self {
            create: CreateAccountHandler::new(repository.clone(), settings.clone()),
            delete: DeleteAccountHandler::new(repository, settings),
        }
    }

    pub async fn create_account(&self, user_id: UserId, metadata: CommandMetadata) -> Result<Progress, DomainError> {
        self.create.handle(CreateAccountCommand { user_id }, metadata).await
    }

    pub async fn delete_account(
        &self,
        user_id: UserId,
        metadata: CommandMetadata,
    ) -> Result<AccountDeletionReport, DomainError> {
        self.delete.handle(DeleteAccountCommand { user_id }, metadata).await
    }
}
