//! Lifecycle statuses for game and scenario rounds.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle of a game round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    Idle,
    Playing,
    Complete,
}

impl StateMachine for GameStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use GameStatus::*;
        matches!(
            (self, target),
            (Idle, Playing)
                | (Playing, Complete)
                | (Complete, Playing)
                | (Playing, Idle)
                | (Complete, Idle)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use GameStatus::*;
        match self {
            Idle => vec![Playing],
            Playing => vec![Complete, Idle],
            Complete => vec![Playing, Idle],
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GameStatus::Idle => "idle",
            GameStatus::Playing => "playing",
            GameStatus::Complete => "complete",
        };
        write!(f, "{}", s)
    }
}

/// Lifecycle of a scenario round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    #[default]
    Idle,
    Active,
    Complete,
}

impl StateMachine for ScenarioStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ScenarioStatus::*;
        matches!(
            (self, target),
            (Idle, Active)
                | (Active, Complete)
                | (Complete, Active)
                | (Active, Idle)
                | (Complete, Idle)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ScenarioStatus::*;
        match self {
            Idle => vec![Active],
            Active => vec![Complete, Idle],
            Complete => vec![Active, Idle],
        }
    }
}

impl fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScenarioStatus::Idle => "idle",
            ScenarioStatus::Active => "active",
            ScenarioStatus::Complete => "complete",
        };
        write!(f, "{}", s)
    }
}
