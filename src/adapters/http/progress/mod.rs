//! Progress HTTP adapter.

pub mod dto;
mod handlers;
mod routes;

pub use routes::progress_routes;
