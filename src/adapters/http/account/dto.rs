//! HTTP DTOs for account endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::account::AccountDeletionReport;

/// Rows removed by an account deletion, per table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedRows {
    pub scenario_scores: u64,
    pub progress: u64,
    pub sessions: u64,
    pub linked_identities: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAccountResponse {
    pub user_id: String,
    pub deleted_at: DateTime<Utc>,
    pub removed: RemovedRows,
}

impl From<&AccountDeletionReport> for DeleteAccountResponse {
    fn from(report: &AccountDeletionReport) -> Self {
        Self {
            user_id: report.user_id.to_string(),
            deleted_at: *report.deleted_at.as_datetime(),
            removed: RemovedRows {
                scenario_scores: report.scenario_scores,
                progress: report.progress,
                sessions: report.sessions,
                linked_identities: report.linked_identities,
                total: report.total_rows(),
            },
        }
    }
}
