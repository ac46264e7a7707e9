//! Progress application handlers.
//!
//! The Progress Update Service operations: read (self-healing), game and
//! scenario completion writes, and the statistics query.

mod get_progress;
mod get_stats;
mod record_game_completion;
mod record_scenario_completion;

pub use get_progress::{GetProgressHandler, GetProgressQuery};
pub use get_stats::{GetStatsHandler, GetStatsQuery};
pub use record_game_completion::{
    RecordGameCompletionCommand, RecordGameCompletionHandler, RecordGameCompletionResult,
};
pub use record_scenario_completion::{
    RecordScenarioCompletionCommand, RecordScenarioCompletionHandler,
};
