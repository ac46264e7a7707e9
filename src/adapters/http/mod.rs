//! HTTP adapters - REST API over the progress and account services.
//!
//! Each module has its own DTOs, handlers and routes; `router` assembles
//! them under `/api`.

pub mod account;
pub mod auth;
pub mod error;
pub mod progress;
mod router;
mod state;

pub use auth::AuthenticatedUser;
pub use error::{ApiError, ErrorResponse};
pub use router::{api_router, with_middleware};
pub use state::AppState;
