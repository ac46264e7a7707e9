//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `ProgressRepository` - Transactional writes of the progress record
//! - `ScenarioScoreReader` - Queries over scenario score rows
//! - `AccountRepository` - User creation and cascading deletion
//!
//! ## Session Ports
//!
//! - `CompletionRecorder` - Sink for finished game and scenario sessions

mod account_repository;
mod completion_recorder;
mod progress_repository;
mod scenario_score_reader;

pub use account_repository::AccountRepository;
pub use completion_recorder::{CompletionRecorder, GameCompletionReceipt};
pub use progress_repository::ProgressRepository;
pub use scenario_score_reader::ScenarioScoreReader;
