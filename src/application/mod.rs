//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, it separates command handlers (write) from query handlers (read).
//! `sessions` hosts the live, timer-driven game and scenario sessions.

mod account_lifecycle;
pub mod handlers;
mod progress_service;
pub mod sessions;
mod settings;
pub mod transaction;

pub use account_lifecycle::AccountLifecycle;
pub use progress_service::ProgressService;
pub use settings::ProgressSettings;
