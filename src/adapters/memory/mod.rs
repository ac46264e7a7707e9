//! In-memory persistence adapter.
//!
//! Used by tests and by the server when no database is configured.

mod store;

pub use store::{InMemoryStore, RowCounts};
