//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, errors and the state machine trait
//! that form the vocabulary of the progress domain.

mod command;
mod errors;
mod ids;
mod state_machine;
mod timestamp;
mod vigilance;

pub use command::CommandMetadata;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{BadgeId, GameId, ScenarioId, UserId, MAX_ID_LENGTH};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
pub use vigilance::VigilanceScore;
