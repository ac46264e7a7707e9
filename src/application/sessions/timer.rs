//! Cancellable countdown timer.
//!
//! A `CountdownTimer` owns a background task that calls its target once per
//! period. The task stops when:
//! - the timer is cancelled or dropped
//! - the target is dropped
//! - the target returns `TickControl::Stop`
//!
//! Cancellation is a signal, not an abort, so a tick that is already running
//! (e.g. one that is finishing the session) always runs to completion. A
//! cancelled timer never starts another tick, but a tick already waiting on
//! the target's lock can still arrive after a replacement timer started.
//! Every tick therefore carries the generation its timer was started with,
//! and targets drop ticks whose generation is no longer current.

use async_trait::async_trait;
use std::sync::Weak;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Whether the timer should keep running after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Stop,
}

/// Receiver of countdown ticks.
#[async_trait]
pub trait CountdownTarget: Send + Sync + 'static {
    async fn on_tick(&self, generation: u64) -> TickControl;
}

/// Handle to a running countdown. Dropping it stops the countdown.
#[derive(Debug)]
pub struct CountdownTimer {
    cancel: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl CountdownTimer {
    /// Starts ticking `target` every `period`, first tick one period from now.
    /// Each tick is tagged with `generation`.
    pub fn start<T: CountdownTarget>(target: Weak<T>, period: Duration, generation: u64) -> Self {
        let (cancel, mut cancelled) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;

                    _ = cancelled.changed() => break,

                    _ = interval.tick() => {
                        let Some(target) = target.upgrade() else {
                            break;
                        };
                        if target.on_tick(generation).await == TickControl::Stop {
                            break;
                        }
                    }
                }
            }
        });

        Self { cancel, handle }
    }

    /// Signals the countdown to stop before its next tick.
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    /// True once the background task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
