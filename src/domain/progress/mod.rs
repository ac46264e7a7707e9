//! Progress domain module.
//!
//! The durable per-user record (experience, level, vigilance, completed
//! content, badges, counters), the scenario score rows it owns, and the
//! statistics view derived from both.

mod aggregate;
pub mod badges;
mod scenario_score;
mod stats;

pub use aggregate::{GameCompletion, GameCompletionOutcome, GamePerformance, Progress};
pub use scenario_score::{ScenarioCompletion, ScenarioScore};
pub use stats::{ProgressStats, RECENT_SCORES_LIMIT};
