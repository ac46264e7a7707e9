//! Tunables shared by the progress handlers and sessions.

use std::time::Duration;

/// Settings for progress writes and session timers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSettings {
    /// Number of scenarios in the content catalog, used for completion rate
    /// and the catalog badge.
    pub scenario_catalog_size: usize,
    /// Upper bound on a single persistence transaction.
    pub transaction_timeout: Duration,
    /// Seconds on the clock when a game starts.
    pub game_time_limit: u32,
    /// Seconds on the (advisory) clock when a scenario starts.
    pub scenario_time_limit: u32,
    /// Questions per game.
    pub questions_per_game: u32,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            scenario_catalog_size: 10,
            transaction_timeout: Duration::from_millis(5000),
            game_time_limit: 60,
            scenario_time_limit: 30,
            questions_per_game: 10,
        }
    }
}
