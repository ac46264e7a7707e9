//! Notifications published by sessions for the presentation layer.

use serde::{Deserialize, Serialize};

use crate::domain::scoring::AccuracyTier;

/// Capacity of each session's notice channel. Slow subscribers lag and skip.
pub const NOTICE_CAPACITY: usize = 32;

/// Visual tier of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeTier {
    Success,
    Info,
    Warning,
    Error,
}

impl From<AccuracyTier> for NoticeTier {
    fn from(tier: AccuracyTier) -> Self {
        match tier {
            AccuracyTier::Success => NoticeTier::Success,
            AccuracyTier::Info => NoticeTier::Info,
            AccuracyTier::Warning => NoticeTier::Warning,
        }
    }
}

/// A message for the user about a session event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionNotice {
    pub tier: NoticeTier,
    pub title: String,
    pub message: String,
}

impl SessionNotice {
    pub fn new(tier: NoticeTier, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tier,
            title: title.into(),
            message: message.into(),
        }
    }
}
