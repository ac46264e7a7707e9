//! Game round - the pure state machine behind one timed quiz play-through.
//!
//! Holds no timer and performs no I/O. The session layer drives it with
//! `tick()` once per second and performs side effects on the `GameResult`
//! returned by `complete()`.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode, StateMachine, ValidationError};
use crate::domain::scoring::{AccuracyTier, ScoreCalculator, MAX_HINTS};

use super::GameStatus;

/// Effect of an answer or skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Round was not playing; nothing changed.
    Ignored,
    /// Moved on to the next question.
    Advanced,
    /// The last question was answered; the round must complete.
    LastQuestion,
}

/// Effect of one timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Round was not playing; nothing changed.
    Ignored,
    /// Time remains.
    Running { time_left: u32 },
    /// The timer reached zero; the round must complete.
    Expired,
}

/// Final numbers of a completed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub score: u32,
    pub correct_answers: u32,
    pub questions_answered: u32,
    pub total_questions: u32,
    pub hints_used: u8,
    pub time_left: u32,
    pub time_spent: u32,
    pub time_bonus: u32,
    pub accuracy_percent: u32,
    pub tier: AccuracyTier,
    pub xp_gained: u64,
}

/// Observable state of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub status: GameStatus,
    pub question_index: u32,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub hints_used: u8,
    pub time_left: u32,
    pub score: u32,
}

/// One game play-through.
///
/// # Invariants
///
/// - `complete()` yields a result at most once per `start()`
/// - `hints_used <= MAX_HINTS`
/// - `question_index < total_questions`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRound {
    status: GameStatus,
    total_questions: u32,
    time_limit: u32,
    question_index: u32,
    questions_answered: u32,
    correct_answers: u32,
    hints_used: u8,
    time_left: u32,
    score: u32,
}

impl GameRound {
    /// Creates an idle round.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` if `total_questions` is 0
    pub fn new(total_questions: u32, time_limit: u32) -> Result<Self, ValidationError> {
        if total_questions == 0 {
            return Err(ValidationError::out_of_range(
                "total_questions",
                1,
                i64::from(u32::MAX),
                0,
            ));
        }
        Ok(Self {
            status: GameStatus::Idle,
            total_questions,
            time_limit,
            question_index: 0,
            questions_answered: 0,
            correct_answers: 0,
            hints_used: 0,
            time_left: time_limit,
            score: 0,
        })
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            status: self.status,
            question_index: self.question_index,
            total_questions: self.total_questions,
            correct_answers: self.correct_answers,
            hints_used: self.hints_used,
            time_left: self.time_left,
            score: self.score,
        }
    }

    /// Starts (or restarts) the round with a fresh timer.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if already playing
    pub fn start(&mut self) -> Result<(), DomainError> {
        self.status = self.status.transition_to(GameStatus::Playing)?;
        self.question_index = 0;
        self.questions_answered = 0;
        self.correct_answers = 0;
        self.hints_used = 0;
        self.score = 0;
        self.time_left = self.time_limit;
        Ok(())
    }

    /// Records an answer to the current question.
    pub fn answer(&mut self, is_correct: bool) -> AnswerOutcome {
        if self.status != GameStatus::Playing {
            return AnswerOutcome::Ignored;
        }
        if is_correct {
            self.correct_answers += 1;
        }
        self.advance()
    }

    /// Skips the current question; counts as answered but never as correct.
    pub fn skip(&mut self) -> AnswerOutcome {
        if self.status != GameStatus::Playing {
            return AnswerOutcome::Ignored;
        }
        self.advance()
    }

    /// Consumes one hint, returning how many remain.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if not playing
    /// - `HintLimitReached` once `MAX_HINTS` hints were used
    pub fn use_hint(&mut self) -> Result<u8, DomainError> {
        if self.status != GameStatus::Playing {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Hints are only available while playing (status: {})", self.status),
            ));
        }
        if self.hints_used >= MAX_HINTS {
            return Err(DomainError::new(
                ErrorCode::HintLimitReached,
                format!("All {} hints have been used", MAX_HINTS),
            ));
        }
        self.hints_used += 1;
        Ok(MAX_HINTS - self.hints_used)
    }

    /// Counts down one second.
    pub fn tick(&mut self) -> TickOutcome {
        if self.status != GameStatus::Playing {
            return TickOutcome::Ignored;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            TickOutcome::Expired
        } else {
            TickOutcome::Running {
                time_left: self.time_left,
            }
        }
    }

    /// Finishes the round and computes its result.
    ///
    /// Returns `None` unless the round is playing, so concurrent completion
    /// paths (last answer, timer expiry, explicit finish) yield one result.
    pub fn complete(&mut self) -> Option<GameResult> {
        if self.status != GameStatus::Playing {
            return None;
        }
        self.status = GameStatus::Complete;

        let time_bonus = ScoreCalculator::time_bonus(self.time_left, self.time_limit);
        let score = ScoreCalculator::game_score(
            self.correct_answers,
            self.total_questions,
            time_bonus,
            self.hints_used,
        );
        self.score = score;
        let accuracy_percent =
            ScoreCalculator::accuracy_percent(self.correct_answers, self.total_questions);

        Some(GameResult {
            score,
            correct_answers: self.correct_answers,
            questions_answered: self.questions_answered,
            total_questions: self.total_questions,
            hints_used: self.hints_used,
            time_left: self.time_left,
            time_spent: self.time_limit.saturating_sub(self.time_left),
            time_bonus,
            accuracy_percent,
            tier: AccuracyTier::classify(self.correct_answers, self.total_questions),
            xp_gained: ScoreCalculator::xp_gained(score),
        })
    }

    /// Returns to idle, discarding the current play-through.
    pub fn reset(&mut self) {
        self.status = GameStatus::Idle;
        self.question_index = 0;
        self.questions_answered = 0;
        self.correct_answers = 0;
        self.hints_used = 0;
        self.score = 0;
        self.time_left = self.time_limit;
    }

    fn advance(&mut self) -> AnswerOutcome {
        self.questions_answered += 1;
        if self.question_index + 1 >= self.total_questions {
            AnswerOutcome::LastQuestion
        } else {
            self.question_index += 1;
            AnswerOutcome::Advanced
        }
    }
}
