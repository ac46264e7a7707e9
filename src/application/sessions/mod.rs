//! Live game and scenario sessions.
//!
//! Sessions wrap the pure rounds from `domain::play` with a cancellable
//! countdown, a notice channel for the presentation layer, and a
//! `CompletionRecorder` that persists finished play-throughs.

mod game_session;
mod notice;
mod scenario_session;
mod timer;

pub use game_session::{GameSession, TICK_PERIOD};
pub use notice::{NoticeTier, SessionNotice, NOTICE_CAPACITY};
pub use scenario_session::ScenarioSession;
pub use timer::{CountdownTarget, CountdownTimer, TickControl};

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    use crate::domain::foundation::{DomainError, Timestamp, UserId};
    use crate::domain::progress::{GameCompletion, Progress, ScenarioCompletion, ScenarioScore};
    use crate::ports::{CompletionRecorder, GameCompletionReceipt};

    /// Recorder that captures every call, optionally failing all of them.
    pub struct RecordingRecorder {
        games: Mutex<Vec<GameCompletion>>,
        scenarios: Mutex<Vec<ScenarioCompletion>>,
        fail: bool,
    }

    impl RecordingRecorder {
        pub fn new() -> Arc<Self> {
            Arc::new(Self {
                games: Mutex::new(Vec::new()),
                scenarios: Mutex::new(Vec::new()),
                fail: false,
            })
        }

        pub fn failing() -> Arc<Self> {
            Arc::new(Self {
                games: Mutex::new(Vec::new()),
                scenarios: Mutex::new(Vec::new()),
                fail: true,
            })
        }

        pub fn games(&self) -> Vec<GameCompletion> {
            self.games.lock().unwrap().clone()
        }

        pub fn scenarios(&self) -> Vec<ScenarioCompletion> {
            self.scenarios.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionRecorder for RecordingRecorder {
        async fn record_game(
            &self,
            user_id: &UserId,
            completion: GameCompletion,
        ) -> Result<GameCompletionReceipt, DomainError> {
            self.games.lock().unwrap().push(completion.clone());
            if self.fail {
                return Err(DomainError::database("store unavailable"));
            }
            let mut progress = Progress::new(user_id.clone(), Timestamp::now());
            let outcome = progress.record_game(&completion, Timestamp::now(), 10);
            Ok(GameCompletionReceipt { progress, outcome })
        }

        async fn record_scenario(
            &self,
            user_id: &UserId,
            completion: ScenarioCompletion,
        ) -> Result<ScenarioScore, DomainError> {
            self.scenarios.lock().unwrap().push(completion.clone());
            if self.fail {
                return Err(DomainError::database("store unavailable"));
            }
            Ok(ScenarioScore::from_completion(user_id.clone(), &completion, Timestamp::now()))
        }
    }
}
