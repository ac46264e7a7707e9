//! Scenario round - a single timed decision.
//!
//! The countdown is advisory: reaching zero never resolves the round.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, StateMachine, ValidationError};
use crate::domain::scoring::ScoreCalculator;

use super::ScenarioStatus;

/// Outcome of a resolved scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub action: String,
    pub is_correct: bool,
    pub score: u32,
    pub time_bonus: u32,
    pub time_left: u32,
    pub time_spent: u32,
    pub xp_gained: u64,
}

/// Observable state of a scenario round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSnapshot {
    pub status: ScenarioStatus,
    pub time_left: u32,
    pub selected_action: Option<String>,
    pub score: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioRound {
    status: ScenarioStatus,
    max_time: u32,
    time_left: u32,
    selected_action: Option<String>,
    score: Option<u32>,
}

impl ScenarioRound {
    pub fn new(max_time: u32) -> Self {
        Self {
            status: ScenarioStatus::Idle,
            max_time,
            time_left: max_time,
            selected_action: None,
            score: None,
        }
    }

    pub fn status(&self) -> ScenarioStatus {
        self.status
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn snapshot(&self) -> ScenarioSnapshot {
        ScenarioSnapshot {
            status: self.status,
            time_left: self.time_left,
            selected_action: self.selected_action.clone(),
            score: self.score,
        }
    }

    /// Activates the round with a full timer, clearing any previous decision.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if already active
    pub fn start(&mut self) -> Result<(), DomainError> {
        self.status = self.status.transition_to(ScenarioStatus::Active)?;
        self.time_left = self.max_time;
        self.selected_action = None;
        self.score = None;
        Ok(())
    }

    /// Counts down one second. Returns the remaining time, or `None` when
    /// the round is not active.
    pub fn tick(&mut self) -> Option<u32> {
        if self.status != ScenarioStatus::Active {
            return None;
        }
        self.time_left = self.time_left.saturating_sub(1);
        Some(self.time_left)
    }

    /// Resolves the decision and scores it.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if `action` is blank
    /// - `InvalidStateTransition` if the round is not active
    pub fn resolve(&mut self, action: &str, is_correct: bool) -> Result<ScenarioResult, DomainError> {
        let action = action.trim();
        if action.is_empty() {
            return Err(ValidationError::empty_field("action").into());
        }
        self.status = self.status.transition_to(ScenarioStatus::Complete)?;

        let time_bonus = ScoreCalculator::time_bonus(self.time_left, self.max_time);
        let score = ScoreCalculator::scenario_score(is_correct, time_bonus);
        self.selected_action = Some(action.to_string());
        self.score = Some(score);

        Ok(ScenarioResult {
            action: action.to_string(),
            is_correct,
            score,
            time_bonus,
            time_left: self.time_left,
            time_spent: self.max_time.saturating_sub(self.time_left),
            xp_gained: ScoreCalculator::xp_gained(score),
        })
    }

    /// Returns to idle. Stored progress is untouched.
    pub fn reset(&mut self) {
        self.status = ScenarioStatus::Idle;
        self.time_left = self.max_time;
        self.selected_action = None;
        self.score = None;
    }
}
