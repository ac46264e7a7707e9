//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod account;
pub mod progress;

pub use account::{CreateAccountCommand, CreateAccountHandler, DeleteAccountCommand, DeleteAccountHandler};
pub use progress::{
    GetProgressHandler, GetProgressQuery, GetStatsHandler, GetStatsQuery,
    RecordGameCompletionCommand, RecordGameCompletionHandler, RecordGameCompletionResult,
    RecordScenarioCompletionCommand, RecordScenarioCompletionHandler,
};
