//! Vigilance Engine - progress and scoring for security-awareness training.
//!
//! Scores timed quiz games and decision scenarios, keeps each user's durable
//! progress record (experience, level, vigilance score, badges), and manages
//! the account lifecycle around it.
//!
//! # Layout
//!
//! - `domain` - Scoring rules, play state machines, the progress aggregate
//! - `ports` - Persistence and completion-recording traits
//! - `application` - Command handlers, services, and timed play sessions
//! - `adapters` - In-memory and PostgreSQL stores, the HTTP API
//! - `config` - Environment-driven configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
