//! DeleteAccount - Command handler for cascading account deletion.

use std::sync::Arc;

use crate::application::transaction::bounded;
use crate::application::ProgressSettings;
use crate::domain::account::AccountDeletionReport;
use crate::domain::foundation::{CommandMetadata, DomainError, Timestamp, UserId};
use crate::ports::AccountRepository;

/// Command to delete an account and everything it owns.
#[derive(Debug, Clone)]
pub struct DeleteAccountCommand {
    pub user_id: UserId,
}

/// Handler for account deletion.
///
/// Scenario scores, progress, sessions, linked identities and the user row
/// are removed as one transaction. A failure or timeout leaves every row in
/// place.
pub struct DeleteAccountHandler {
    repository: Arc<dyn AccountRepository>,
    settings: ProgressSettings,
}

impl DeleteAccountHandler {
    pub fn new(repository: Arc<dyn AccountRepository>, settings: ProgressSettings) -> Self {
        Self { repository, settings }
    }

    pub async fn handle(
        &self,
        cmd: DeleteAccountCommand,
        metadata: CommandMetadata,
    ) -> Result<AccountDeletionReport, DomainError> {
        metadata.authorize(&cmd.user_id)?;

        let result = bounded(
            self.settings.transaction_timeout,
            "delete account",
            self.repository.delete_cascade(&cmd.user_id, Timestamp::now()),
        )
        .await;

        match result {
            Ok(report) => {
                tracing::info!(
                    user_id = %cmd.user_id,
                    scenario_scores = report.scenario_scores,
                    sessions = report.sessions,
                    linked_identities = report.linked_identities,
                    correlation_id = %metadata.correlation_id(),
                    "Account deleted"
                );
                Ok(report)
            }
            Err(err) => {
                tracing::warn!(user_id = %cmd.user_id, error = %err, "Account deletion failed");
                Err(err)
            }
        }
    }
}
