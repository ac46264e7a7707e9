//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application to external systems:
//! - `memory` - In-process transactional store for tests and local runs
//! - `postgres` - PostgreSQL persistence
//! - `http` - Axum REST API

pub mod http;
pub mod memory;
pub mod postgres;
