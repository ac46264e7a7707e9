//! Scenario score entity and completion inputs.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ScenarioId, Timestamp, UserId};

/// Latest result of one user on one scenario.
///
/// # Invariants
///
/// - Exactly one row exists per `(user_id, scenario_id)`; replays overwrite
///   `score`, `time_spent` and `completed_at` in place
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioScore {
    pub user_id: UserId,
    pub scenario_id: ScenarioId,
    pub score: u32,
    /// Seconds spent on the scenario.
    pub time_spent: u32,
    pub completed_at: Timestamp,
}

impl ScenarioScore {
    /// Builds the row for a completion submitted at `completed_at`.
    pub fn from_completion(
        user_id: UserId,
        completion: &ScenarioCompletion,
        completed_at: Timestamp,
    ) -> Self {
        Self {
            user_id,
            scenario_id: completion.scenario_id.clone(),
            score: completion.score,
            time_spent: completion.time_spent,
            completed_at,
        }
    }

    /// Returns true if this row belongs to the same `(user, scenario)` key.
    pub fn same_key(&self, other: &ScenarioScore) -> bool {
        self.user_id == other.user_id && self.scenario_id == other.scenario_id
    }
}

/// A finished scenario as reported by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioCompletion {
    pub scenario_id: ScenarioId,
    pub score: u32,
    pub time_spent: u32,
}
