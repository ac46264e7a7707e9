//! Account HTTP adapter.

pub mod dto;
mod handlers;
mod routes;

pub use routes::account_routes;
