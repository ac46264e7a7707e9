//! Score Calculator - Pure scoring formulas for games and scenarios.

use serde::{Deserialize, Serialize};

/// Largest bonus awarded for finishing with the full timer remaining.
pub const MAX_TIME_BONUS: u32 = 20;

/// Points deducted per hint used.
pub const HINT_PENALTY: u32 = 10;

/// Hints available in one game session.
pub const MAX_HINTS: u8 = 3;

/// Experience needed per level.
pub const XP_PER_LEVEL: u64 = 100;

/// Score points that convert into one experience point.
pub const SCORE_PER_XP: u32 = 20;

/// Base score for a correct scenario decision.
pub const SCENARIO_CORRECT_SCORE: u32 = 100;

/// Base score for an incorrect scenario decision.
pub const SCENARIO_INCORRECT_SCORE: u32 = 50;

/// Lowest accuracy percentage graded `Success`.
const SUCCESS_THRESHOLD: u64 = 80;

/// Lowest accuracy percentage graded `Info`.
const INFO_THRESHOLD: u64 = 60;

/// Message tier derived from answer accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyTier {
    /// At least 80% correct.
    Success,
    /// At least 60% correct.
    Info,
    /// Below 60% correct.
    Warning,
}

impl AccuracyTier {
    /// Classifies `correct` out of `total` against the exact thresholds.
    ///
    /// Compares cross-multiplied integers, so 159/200 (79.5%) is `Info` even
    /// though its rounded percentage reads 80. Zero questions is `Warning`.
    pub fn classify(correct: u32, total: u32) -> Self {
        let scaled = u64::from(correct.min(total)) * 100;
        let total = u64::from(total);
        if total > 0 && scaled >= SUCCESS_THRESHOLD * total {
            AccuracyTier::Success
        } else if total > 0 && scaled >= INFO_THRESHOLD * total {
            AccuracyTier::Info
        } else {
            AccuracyTier::Warning
        }
    }

    /// Vigilance adjustment applied for a game finished in this tier.
    pub fn vigilance_delta(&self) -> i32 {
        match self {
            AccuracyTier::Success => 2,
            AccuracyTier::Info => 0,
            AccuracyTier::Warning => -2,
        }
    }
}

/// Calculator for game and scenario scores.
///
/// All inputs are unsigned, so negative values cannot reach these formulas;
/// the API boundary rejects them before conversion.
pub struct ScoreCalculator;

impl ScoreCalculator {
    /// Time bonus for `time_left` seconds remaining out of `max_time`.
    ///
    /// Scales linearly from 0 (no time left) to `MAX_TIME_BONUS` (full timer).
    /// `time_left` above `max_time` is capped.
    pub fn time_bonus(time_left: u32, max_time: u32) -> u32 {
        if max_time == 0 {
            return 0;
        }
        let left = u64::from(time_left.min(max_time));
        (left * u64::from(MAX_TIME_BONUS) / u64::from(max_time)) as u32
    }

    /// Accuracy in whole percent, rounded half up. Zero questions is 0%.
    ///
    /// For display and scoring; grade tiers with `AccuracyTier::classify`.
    pub fn accuracy_percent(correct_answers: u32, total_questions: u32) -> u32 {
        if total_questions == 0 {
            return 0;
        }
        let correct = u64::from(correct_answers.min(total_questions));
        ((correct * 100 + u64::from(total_questions) / 2) / u64::from(total_questions)) as u32
    }

    /// Final game score: accuracy percentage plus time bonus minus hint penalty.
    ///
    /// Hints beyond `MAX_HINTS` are not charged. The result never drops below 0.
    pub fn game_score(
        correct_answers: u32,
        total_questions: u32,
        time_bonus: u32,
        hints_used: u8,
    ) -> u32 {
        let base = Self::accuracy_percent(correct_answers, total_questions);
        let penalty = u32::from(hints_used.min(MAX_HINTS)) * HINT_PENALTY;
        (base + time_bonus).saturating_sub(penalty)
    }

    /// Score for a resolved scenario decision.
    pub fn scenario_score(is_correct: bool, time_bonus: u32) -> u32 {
        let base = if is_correct {
            SCENARIO_CORRECT_SCORE
        } else {
            SCENARIO_INCORRECT_SCORE
        };
        base + time_bonus
    }

    /// Experience earned for a score: `round(score / 20)`, halves rounded up.
    pub fn xp_gained(score: u32) -> u64 {
        (u64::from(score) + u64::from(SCORE_PER_XP) / 2) / u64::from(SCORE_PER_XP)
    }

    /// Level for a total experience value: `floor(xp / 100) + 1`.
    pub fn level_for_xp(xp: u64) -> u32 {
        (xp / XP_PER_LEVEL).saturating_add(1).min(u64::from(u32::MAX)) as u32
    }
}
