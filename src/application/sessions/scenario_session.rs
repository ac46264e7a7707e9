//! Live scenario session: one decision with an advisory countdown.

use async_trait::async_trait;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};

use crate::application::ProgressSettings;
use crate::domain::foundation::{DomainError, ScenarioId, UserId};
use crate::domain::play::{ScenarioResult, ScenarioRound, ScenarioSnapshot};
use crate::domain::progress::ScenarioCompletion;
use crate::ports::CompletionRecorder;

use super::game_session::TICK_PERIOD;
use super::notice::{NoticeTier, SessionNotice, NOTICE_CAPACITY};
use super::timer::{CountdownTarget, CountdownTimer, TickControl};

struct ScenarioState {
    round: ScenarioRound,
    timer: Option<CountdownTimer>,
    /// Generation of the timer started by the latest `start`.
    timer_generation: u64,
}

/// One user's attempt at one scenario.
///
/// The countdown only feeds the time bonus; running out of time never
/// resolves the scenario.
pub struct ScenarioSession {
    user_id: UserId,
    scenario_id: ScenarioId,
    state: Mutex<ScenarioState>,
    recorder: Arc<dyn CompletionRecorder>,
    notices: broadcast::Sender<SessionNotice>,
    tick_period: Duration,
    this: Weak<ScenarioSession>,
}

impl ScenarioSession {
    pub fn new(
        user_id: UserId,
        scenario_id: ScenarioId,
        time_limit_secs: u32,
        recorder: Arc<dyn CompletionRecorder>,
    ) -> Arc<Self> {
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);

        Arc::new_cyclic(|this| Self {
            user_id,
            scenario_id,
            state: Mutex::new(ScenarioState {
                round: ScenarioRound::new(time_limit_secs),
                timer: None,
                timer_generation: 0,
            }),
            recorder,
            notices,
            tick_period: TICK_PERIOD,
            this: this.clone(),
        })
    }

    pub fn with_settings(
        user_id: UserId,
        scenario_id: ScenarioId,
        settings: &ProgressSettings,
        recorder: Arc<dyn CompletionRecorder>,
    ) -> Arc<Self> {
        Self::new(user_id, scenario_id, settings.scenario_time_limit, recorder)
    }

    pub fn scenario_id(&self) -> &ScenarioId {
        &self.scenario_id
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionNotice> {
        self.notices.subscribe()
    }

    pub async fn snapshot(&self) -> ScenarioSnapshot {
        self.state.lock().await.round.snapshot()
    }

    /// Activates the scenario with a full timer.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if already active
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

        tracing::debug!(user_id = %self.user_id, scenario_id = %self.scenario_id, "Scenario session started");
        self.notify(SessionNotice::new(NoticeTier::Info, "Scenario started", "Choose how to respond."));
        Ok(())
    }

    /// Resolves the scenario with the chosen action and records the score.
    ///
    /// A recorder failure does not undo the resolution; it is reported as an
    /// error-tier notice.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the scenario is not active
    /// - `ValidationFailed` if `action` is blank
    pub async fn resolve(&self, action: &str, is_correct: bool) -> Result<ScenarioResult, DomainError> {
        let result = {
            let mut state = self.state.lock().await;
            let result = state.round.resolve(action, is_correct)?;
            state.timer = None;
            result
        };

        let completion = ScenarioCompletion {
            scenario_id: self.scenario_id.clone(),
            score: result.score,
            time_spent: result.time_spent,
        };

        match self.recorder.record_scenario(&self.user_id, completion).await {
            Ok(_) => {
                let (tier, title) = if result.is_correct {
                    (NoticeTier::Success, "Well spotted")
                } else {
                    (NoticeTier::Warning, "Not quite")
                };
                self.notify(SessionNotice::new(
                    tier,
                    title,
                    format!("Score {}. +{} XP", result.score, result.xp_gained),
                ));
            }
            Err(err) => {
                tracing::warn!(
                    user_id = %self.user_id,
                    scenario_id = %self.scenario_id,
                    error = %err,
                    "Failed to record scenario completion"
                );
                self.notify(SessionNotice::new(
                    NoticeTier::Error,
                    "Progress not saved",
                    err.message(),
                ));
            }
        }

        Ok(result)
    }

    /// Returns to idle. Stored progress is untouched.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.round.reset();
        state.timer = None;
    }

    fn notify(&self, notice: SessionNotice) {
        let _ = self.notices.send(notice);
    }
}

#[async_trait]
impl CountdownTarget for ScenarioSession {
    async fn on_tick(&self, generation: u64) -> TickControl {
        let mut state = self.state.lock().await;
        if generation != state.timer_generation {
            return TickControl::Stop;
        }
        match state.round.tick() {
            Some(0) | None => TickControl::Stop,
            Some(_) => TickControl::Continue,
        }
    }
}
