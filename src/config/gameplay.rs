//! Gameplay and persistence tuning

use serde::Deserialize;
use std::time::Duration;

use crate::application::ProgressSettings;

use super::error::ValidationError;

/// Gameplay configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GameplayConfig {
    #[serde(default = "default_game_time_limit")]
    pub game_time_limit_secs: u32,

    #[serde(default = "default_scenario_time_limit")]
    pub scenario_time_limit_secs: u32,

    #[serde(default = "default_questions_per_game")]
    pub questions_per_game: u32,

    /// Scenarios in the content catalog
    #[serde(default = "default_scenario_catalog_size")]
    pub scenario_catalog_size: usize,

    /// Bound on each persistence transaction
    #[serde(default = "default_transaction_timeout_ms")]
    pub transaction_timeout_ms: u64,
}

impl GameplayConfig {
    /// Settings handed to the application layer.
    pub fn progress_settings(&self) -> ProgressSettings {
        ProgressSettings {
            scenario_catalog_size: self.scenario_catalog_size,
            transaction_timeout: Duration::from_millis(self.transaction_timeout_ms),
            game_time_limit: self.game_time_limit_secs,
            scenario_time_limit: self.scenario_time_limit_secs,
            questions_per_game: self.questions_per_game,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.game_time_limit_secs == 0 {
            return Err(ValidationError::ZeroGameplaySetting("game_time_limit_secs"));
        }
        if self.scenario_time_limit_secs == 0 {
            return Err(ValidationError::ZeroGameplaySetting("scenario_time_limit_secs"));
        }
        if self.questions_per_game == 0 {
            return Err(ValidationError::ZeroGameplaySetting("questions_per_game"));
        }
        if self.scenario_catalog_size == 0 {
            return Err(ValidationError::ZeroGameplaySetting("scenario_catalog_size"));
        }
        if self.transaction_timeout_ms == 0 {
            return Err(ValidationError::ZeroGameplaySetting("transaction_timeout_ms"));
        }
        Ok(())
    }
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            game_time_limit_secs: default_game_time_limit(),
            scenario_time_limit_secs: default_scenario_time_limit(),
            questions_per_game: default_questions_per_game(),
            scenario_catalog_size: default_scenario_catalog_size(),
            transaction_timeout_ms: default_transaction_timeout_ms(),
        }
    }
}

fn default_game_time_limit() -> u32 {
    60
}

fn default_scenario_time_limit() -> u32 {
    30
}

fn default_questions_per_game() -> u32 {
    10
}

fn default_scenario_catalog_size() -> usize {
    10
}

fn default_transaction_timeout_ms() -> u64 {
    5000
}
