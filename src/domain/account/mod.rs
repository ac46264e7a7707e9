//! Account module - the user record that owns progress and its dependents.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId};

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub user_id: UserId,
    pub created_at: Timestamp,
}

impl Account {
    pub fn new(user_id: UserId, created_at: Timestamp) -> Self {
        Self { user_id, created_at }
    }
}

/// Row counts removed by a cascading account deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDeletionReport {
    pub user_id: UserId,
    pub scenario_scores: u64,
    pub progress: u64,
    pub sessions: u64,
    pub linked_identities: u64,
    pub deleted_at: Timestamp,
}

impl AccountDeletionReport {
    /// Total rows removed, including the user row itself.
    pub fn total_rows(&self) -> u64 {
        self.scenario_scores + self.progress + self.sessions + self.linked_identities + 1
    }
}
