//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `scoring` - Pure score, time bonus, XP and level formulas
//! - `play` - Game and scenario round state machines
//! - `progress` - Progress aggregate, scenario scores, badges and stats
//! - `account` - User record and deletion report

pub mod account;
pub mod foundation;
pub mod play;
pub mod progress;
pub mod scoring;
