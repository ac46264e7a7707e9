//! Account application handlers.
//!
//! Account bootstrap and the cascading deletion coordinator.

mod create_account;
mod delete_account;

pub use create_account::{CreateAccountCommand, CreateAccountHandler};
pub use delete_account::{DeleteAccountCommand, DeleteAccountHandler};
