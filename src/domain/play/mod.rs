//! Play module - pure state machines for one game or scenario play-through.
//!
//! Rounds hold no timers and perform no I/O; `application::sessions` wraps
//! them with a countdown, notifications, and the completion recorder.

mod game_round;
mod scenario_round;
mod status;

pub use game_round::{AnswerOutcome, GameResult, GameRound, GameSnapshot, TickOutcome};
pub use scenario_round::{ScenarioResult, ScenarioRound, ScenarioSnapshot};
pub use status::{GameStatus, ScenarioStatus};
