//! Shared application state for the HTTP surface.

use std::sync::Arc;

use crate::adapters::memory::InMemoryStore;
use crate::application::{AccountLifecycle, ProgressService, ProgressSettings};
use crate::domain::foundation::DomainError;
use crate::ports::{AccountRepository, ProgressRepository, ScenarioScoreReader};

use super::error::ApiError;

/// Shared application state containing all dependencies.
///
/// Cloned for each request; services are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub progress: Arc<ProgressService>,
    pub accounts: Arc<AccountLifecycle>,
    /// Include storage and internal error messages in responses.
    pub expose_internal_errors: bool,
}

impl AppState {
    pub fn new(
        progress_repository: Arc<dyn ProgressRepository>,
        score_reader: Arc<dyn ScenarioScoreReader>,
        account_repository: Arc<dyn AccountRepository>,
        settings: ProgressSettings,
        expose_internal_errors: bool,
    ) -> Self {
        Self {
            progress: Arc::new(ProgressService::new(
                progress_repository,
                score_reader,
                settings.clone(),
            )),
            accounts: Arc::new(AccountLifecycle::new(account_repository, settings)),
            expose_internal_errors,
        }
    }

    /// State backed entirely by one in-memory store.
    pub fn in_memory(store: Arc<InMemoryStore>, settings: ProgressSettings, expose_internal_errors: bool) -> Self {
        Self::new(store.clone(), store.clone(), store, settings, expose_internal_errors)
    }

    pub fn api_error(&self, error: DomainError) -> ApiError {
        ApiError::new(error, self.expose_internal_errors)
    }
}
