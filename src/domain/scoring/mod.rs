//! Scoring Module - Pure functions turning raw performance into scores and XP.
//!
//! No ports or adapters are involved; every function is deterministic and
//! side-effect free.

mod calculator;

pub use calculator::{
    AccuracyTier, ScoreCalculator, HINT_PENALTY, MAX_HINTS, MAX_TIME_BONUS,
    SCENARIO_CORRECT_SCORE, SCENARIO_INCORRECT_SCORE, SCORE_PER_XP, XP_PER_LEVEL,
};
