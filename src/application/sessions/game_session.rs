//! Live game session: a `GameRound` driven by a countdown timer.
//!
//! All state changes happen under one lock. Completion is decided inside the
//! lock by `GameRound::complete`, which yields a result at most once, so the
//! last answer, timer expiry and an explicit `finish` can race freely and the
//! recorder is still called exactly once. The recorder call itself runs after
//! the lock is released.

use async_trait::async_trait;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};

use crate::application::ProgressSettings;
use crate::domain::foundation::{DomainError, ErrorCode, GameId, UserId, ValidationError};
use crate::domain::play::{AnswerOutcome, GameResult, GameRound, GameSnapshot, TickOutcome};
use crate::domain::progress::{GameCompletion, GamePerformance};
use crate::ports::CompletionRecorder;

use super::notice::{NoticeTier, SessionNotice, NOTICE_CAPACITY};
use super::timer::{CountdownTarget, CountdownTimer, TickControl};

/// Interval between countdown ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

struct GameState {
    round: GameRound,
    timer: Option<CountdownTimer>,
    /// Generation of the timer started by the latest `start`.
    timer_generation: u64,
}

/// One user's play-through of one game.
pub struct GameSession {
    user_id: UserId,
    game_id: GameId,
    state: Mutex<GameState>,
    recorder: Arc<dyn CompletionRecorder>,
    notices: broadcast::Sender<SessionNotice>,
    tick_period: Duration,
    this: Weak<GameSession>,
}

impl GameSession {
    /// Creates an idle session.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` if `total_questions` is 0
    pub fn new(
        user_id: UserId,
        game_id: GameId,
        total_questions: u32,
        time_limit_secs: u32,
        recorder: Arc<dyn CompletionRecorder>,
    ) -> Result<Arc<Self>, ValidationError> {
        let round = GameRound::new(total_questions, time_limit_secs)?;
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);

        Ok(Arc::new_cyclic(|this| Self {
            user_id,
            game_id,
            state: Mutex::new(GameState {
                round,
                timer: None,
                timer_generation: 0,
            }),
            recorder,
            notices,
            tick_period: TICK_PERIOD,
            this: this.clone(),
        }))
    }

    /// Creates an idle session sized by the configured gameplay settings.
    pub fn with_settings(
        user_id: UserId,
        game_id: GameId,
        settings: &ProgressSettings,
        recorder: Arc<dyn CompletionRecorder>,
    ) -> Result<Arc<Self>, ValidationError> {
        Self::new(
            user_id,
            game_id,
            settings.questions_per_game,
            settings.game_time_limit,
            recorder,
        )
    }

    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    /// Subscribes to the session's notices.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionNotice> {
        self.notices.subscribe()
    }

    pub async fn snapshot(&self) -> GameSnapshot {
        self.state.lock().await.round.snapshot()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Starts a fresh play-through and its countdown.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if a play-through is already running
    pub async fn start(&self) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        state.round.start()?;
        state.timer_generation += 1;
        state.timer = Some(CountdownTimer::start(
            self.this.clone(),
            self.tick_period,
            state.timer_generation,
        ));
        drop(state);

        tracing::debug!(user_id = %self.user_id, game_id = %self.game_id, "Game session started");
        self.notify(SessionNotice::new(
            NoticeTier::Info,
            "Game started",
            "Answer every question before the timer runs out.",
        ));
        Ok(())
    }

    /// Answers the current question. Answering the last question finishes
    /// the game. Ignored unless playing.
    pub async fn answer(&self, is_correct: bool) -> AnswerOutcome {
        self.step(|round| round.answer(is_correct)).await
    }

    /// Skips the current question. Ignored unless playing.
    pub async fn skip(&self) -> AnswerOutcome {
        self.step(GameRound::skip).await
    }

    /// Uses a hint, returning how many remain.
    ///
    /// # Errors
    ///
    /// - `HintLimitReached` once all hints are used; nothing changes
    /// - `InvalidStateTransition` if not playing
    pub async fn use_hint(&self) -> Result<u8, DomainError> {
        let result = self.state.lock().await.round.use_hint();
        if let Err(err) = &result {
            if err.code == ErrorCode::HintLimitReached {
                self.notify(SessionNotice::new(
                    NoticeTier::Warning,
                    "No hints left",
                    err.message(),
                ));
            }
        }
        result
    }

    /// Finishes the game now. Returns `None` if it was not playing.
    pub async fn finish(&self) -> Option<GameResult> {
        let result = {
            let mut state = self.state.lock().await;
            let result = state.round.complete();
            if result.is_some() {
                state.timer = None;
            }
            result
        };

        if let Some(result) = result {
            self.report(result).await;
        }
        result
    }

    /// Abandons the play-through and returns to idle. Nothing is recorded.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.round.reset();
        state.timer = None;
    }

    async fn step(&self, apply: impl FnOnce(&mut GameRound) -> AnswerOutcome) -> AnswerOutcome {
        let (outcome, result) = {
            let mut state = self.state.lock().await;
            let outcome = apply(&mut state.round);
            let result = if outcome == AnswerOutcome::LastQuestion {
                state.timer = None;
                state.round.complete()
            } else {
                None
            };
            (outcome, result)
        };

        if let Some(result) = result {
            self.report(result).await;
        }
        outcome
    }

    async fn report(&self, result: GameResult) {
        let completion = GameCompletion {
            game_id: self.game_id.clone(),
            score: result.score,
            // GameRound caps hints and never counts more correct than answered
            performance: Some(GamePerformance {
                questions_answered: result.questions_answered,
                correct_answers: result.correct_answers,
                hints_used: result.hints_used,
                time_spent: result.time_spent,
            }),
        };

        match self.recorder.record_game(&self.user_id, completion).await {
            Ok(receipt) => {
                self.notify(SessionNotice::new(
                    result.tier.into(),
                    "Game complete",
                    format!(
                        "Score {} with {}% accuracy. +{} XP",
                        result.score, result.accuracy_percent, receipt.outcome.xp_gained
                    ),
                ));
                if receipt.outcome.leveled_up() {
                    self.notify(SessionNotice::new(
                        NoticeTier::Success,
                        "Level up",
                        format!("You reached level {}", receipt.outcome.new_level),
                    ));
                }
            }
            Err(err) => {
                tracing::warn!(
                    user_id = %self.user_id,
                    game_id = %self.game_id,
                    error = %err,
                    "Failed to record game completion"
                );
                self.notify(SessionNotice::new(
                    NoticeTier::Error,
                    "Progress not saved",
                    err.message(),
                ));
            }
        }
    }

    fn notify(&self, notice: SessionNotice) {
        // no subscribers is fine
        let _ = self.notices.send(notice);
    }
}

#[async_trait]
impl CountdownTarget for GameSession {
    async fn on_tick(&self, generation: u64) -> TickControl {
        let result = {
            let mut state = self.state.lock().await;
            if generation != state.timer_generation {
                return TickControl::Stop;
            }
            match state.round.tick() {
                TickOutcome::Ignored => return TickControl::Stop,
                TickOutcome::Running { .. } => return TickControl::Continue,
                TickOutcome::Expired => {
                    state.timer = None;
                    state.round.complete()
                }
            }
        };

        if let Some(result) = result {
            tracing::debug!(user_id = %self.user_id, game_id = %self.game_id, "Game timer expired");
            self.report(result).await;
        }
        TickControl::Stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sessions::test_support::RecordingRecorder;
    use crate::domain::play::GameStatus;
    use tokio::time;

    fn session(total: u32, limit: u32, recorder: Arc<RecordingRecorder>) -> Arc<GameSession> {
        GameSession::new(
            UserId::new("user-1").unwrap(),
            GameId::new("phish-quiz").unwrap(),
            total,
            limit,
            recorder,
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn start_publishes_notice_and_runs_timer() {
        let recorder = RecordingRecorder::new();
        let session = session(3, 60, recorder);
        let mut notices = session.subscribe();

        session.start().await.unwrap();
        time::sleep(Duration::from_millis(2500)).await;

        assert_eq!(notices.recv().await.unwrap().title, "Game started");
        assert_eq!(session.snapshot().await.time_left, 58);
    }

    #[tokio::test(start_paused = true)]
    async fn last_answer_finishes_and_records() {
        let recorder = RecordingRecorder::new();
        let session = session(2, 60, recorder.clone());
        let mut notices = session.subscribe();
        session.start().await.unwrap();

        assert_eq!(session.answer(true).await, AnswerOutcome::Advanced);
        assert_eq!(session.answer(true).await, AnswerOutcome::LastQuestion);

        assert_eq!(session.snapshot().await.status, GameStatus::Complete);
        let games = recorder.games();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].score, 120);
        assert_eq!(games[0].performance.unwrap().correct_answers, 2);

        notices.recv().await.unwrap();
        let done = notices.recv().await.unwrap();
        assert_eq!(done.tier, NoticeTier::Success);
        assert!(done.message.contains("+6 XP"));
    }

    #[tokio::test(start_paused = true)]
    async fn timer_expiry_finishes_once() {
        let recorder = RecordingRecorder::new();
        let session = session(5, 3, recorder.clone());
        session.start().await.unwrap();
        session.answer(true).await;

        time::sleep(Duration::from_secs(10)).await;

        let snap = session.snapshot().await;
        assert_eq!(snap.status, GameStatus::Complete);
        assert_eq!(snap.time_left, 0);
        let games = recorder.games();
        assert_eq!(games.len(), 1);
        // 20% accuracy, no time bonus
        assert_eq!(games[0].score, 20);
    }

    #[tokio::test(start_paused = true)]
    async fn last_answer_then_expiry_records_once() {
        let recorder = RecordingRecorder::new();
        let session = session(1, 1, recorder.clone());
        session.start().await.unwrap();

        let (outcome, control) = tokio::join!(session.answer(true), session.on_tick(1));

        assert_eq!(outcome, AnswerOutcome::LastQuestion);
        assert_eq!(control, TickControl::Stop);
        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(recorder.games().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_then_last_answer_records_once() {
        let recorder = RecordingRecorder::new();
        let session = session(1, 1, recorder.clone());
        session.start().await.unwrap();

        let (control, outcome) = tokio::join!(session.on_tick(1), session.answer(true));

        assert_eq!(control, TickControl::Stop);
        assert_eq!(outcome, AnswerOutcome::Ignored);
        time::sleep(Duration::from_secs(3)).await;
        let games = recorder.games();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].performance.unwrap().questions_answered, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn background_expiry_racing_last_answer_records_once() {
        let recorder = RecordingRecorder::new();
        let session = session(1, 1, recorder.clone());
        session.start().await.unwrap();

        time::advance(Duration::from_secs(1)).await;
        session.answer(true).await;
        time::sleep(Duration::from_secs(3)).await;

        assert_eq!(recorder.games().len(), 1);
        assert_eq!(session.snapshot().await.status, GameStatus::Complete);
    }

    #[tokio::test(start_paused = true)]
    async fn finish_is_idempotent() {
        let recorder = RecordingRecorder::new();
        let session = session(3, 60, recorder.clone());
        session.start().await.unwrap();

        assert!(session.finish().await.is_some());
        assert!(session.finish().await.is_none());
        time::sleep(Duration::from_secs(120)).await;

        assert_eq!(recorder.games().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn no_ticks_after_finish() {
        let recorder = RecordingRecorder::new();
        let session = session(3, 60, recorder);
        session.start().await.unwrap();
        time::sleep(Duration::from_millis(1500)).await;

        session.finish().await;
        let frozen = session.snapshot().await.time_left;
        time::sleep(Duration::from_secs(5)).await;

        assert_eq!(session.snapshot().await.time_left, frozen);
    }

    #[tokio::test(start_paused = true)]
    async fn answers_are_ignored_when_not_playing() {
        let recorder = RecordingRecorder::new();
        let session = session(1, 60, recorder.clone());

        assert_eq!(session.answer(true).await, AnswerOutcome::Ignored);
        assert!(session.finish().await.is_none());
        assert!(recorder.games().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn hint_limit_warns_without_state_change() {
        let recorder = RecordingRecorder::new();
        let session = session(3, 60, recorder);
        let mut notices = session.subscribe();
        session.start().await.unwrap();
        for _ in 0..3 {
            session.use_hint().await.unwrap();
        }

        let err = session.use_hint().await.unwrap_err();

        assert_eq!(err.code, ErrorCode::HintLimitReached);
        assert_eq!(session.snapshot().await.hints_used, 3);
        notices.recv().await.unwrap();
        assert_eq!(notices.recv().await.unwrap().tier, NoticeTier::Warning);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_stops_timer_without_recording() {
        let recorder = RecordingRecorder::new();
        let session = session(3, 2, recorder.clone());
        session.start().await.unwrap();

        session.reset().await;
        time::sleep(Duration::from_secs(5)).await;

        assert_eq!(session.snapshot().await.status, GameStatus::Idle);
        assert_eq!(session.snapshot().await.time_left, 2);
        assert!(recorder.games().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn recorder_failure_is_surfaced_as_error_notice() {
        let recorder = RecordingRecorder::failing();
        let session = session(1, 60, recorder);
        let mut notices = session.subscribe();
        session.start().await.unwrap();

        session.answer(true).await;

        notices.recv().await.unwrap();
        let notice = notices.recv().await.unwrap();
        assert_eq!(notice.tier, NoticeTier::Error);
        assert_eq!(session.snapshot().await.status, GameStatus::Complete);
    }

    #[tokio::test(start_paused = true)]
    async fn tick_from_replaced_timer_is_dropped() {
        let recorder = RecordingRecorder::new();
        let session = session(3, 60, recorder);
        session.start().await.unwrap();
        session.finish().await;
        session.start().await.unwrap();

        let control = session.on_tick(1).await;

        assert_eq!(control, TickControl::Stop);
        assert_eq!(session.snapshot().await.time_left, 60);
        time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(session.snapshot().await.time_left, 59);
    }

    #[tokio::test(start_paused = true)]
    async fn recorded_performance_mirrors_the_round() {
        let recorder = RecordingRecorder::new();
        let session = session(3, 60, recorder.clone());
        session.start().await.unwrap();
        for _ in 0..3 {
            session.use_hint().await.unwrap();
        }
        session.answer(true).await;
        session.skip().await;
        time::sleep(Duration::from_millis(4500)).await;

        session.finish().await;

        let performance = recorder.games()[0].performance.unwrap();
        assert_eq!(performance.questions_answered, 2);
        assert_eq!(performance.correct_answers, 1);
        assert_eq!(performance.hints_used, 3);
        assert_eq!(performance.time_spent, 4);
        assert!(GamePerformance::new(2, 1, 3, 4).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_completion_resets_round() {
        let recorder = RecordingRecorder::new();
        let session = session(1, 60, recorder.clone());
        session.start().await.unwrap();
        session.answer(true).await;

        session.start().await.unwrap();

        let snap = session.snapshot().await;
        assert_eq!(snap.status, GameStatus::Playing);
        assert_eq!(snap.correct_answers, 0);
        assert_eq!(snap.time_left, 60);
    }
}
