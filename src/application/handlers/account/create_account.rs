//! CreateAccount - Command handler registering a user with default progress.

use std::sync::Arc;

use crate::application::transaction::bounded;
use crate::application::ProgressSettings;
use crate::domain::account::Account;
use crate::domain::foundation::{CommandMetadata, DomainError, Timestamp, UserId};
use crate::domain::progress::Progress;
use crate::ports::AccountRepository;

/// Command to register a new account.
#[derive(Debug, Clone)]
pub struct CreateAccountCommand {
    pub user_id: UserId,
}

/// Handler for account creation. The user row and its default progress are
/// inserted together; an existing user fails with `ConflictDuplicate`.
pub struct CreateAccountHandler {
    repository: Arc<dyn AccountRepository>,
    settings: ProgressSettings,
}

impl CreateAccountHandler {
    pub fn new(repository: Arc<dyn AccountRepository>, settings: ProgressSettings) -> Self {
        Self { repository, settings }
    }

    pub async fn handle(
        &self,
        cmd: CreateAccountCommand,
        metadata: CommandMetadata,
    ) -> Result<Progress, DomainError> {
        metadata.authorize(&cmd.user_id)?;

        let now = Timestamp::now();
        let account = Account::new(cmd.user_id.clone(), now);
        let mut progress = Progress::new(cmd.user_id.clone(), now);

        bounded(
            self.settings.transaction_timeout,
            "create account",
            self.repository.create_with_progress(&account, &progress),
        )
        .await?;
        progress.mark_persisted(1);

        tracing::info!(
            user_id = %cmd.user_id,
            correlation_id = %metadata.correlation_id(),
            "Account created"
        );
        Ok(progress)
    }
}
