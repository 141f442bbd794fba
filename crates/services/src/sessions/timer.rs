use std::sync::Arc;
use std::time::Duration;

use quiz_core::TickOutcome;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::workflow::SharedSession;

/// Repeating countdown task for one session.
///
/// Calls [`SessionEngine::tick`](quiz_core::SessionEngine::tick) once per period and
/// publishes a snapshot whenever the clock moved. The task ends by itself when the
/// session is over or reset, and is aborted when the timer is stopped or dropped.
pub(crate) struct SessionTimer {
    handle: JoinHandle<()>,
}

impl SessionTimer {
    /// Spawns the task on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub(crate) fn spawn(shared: Arc<SharedSession>, period: Duration) -> Self {
        let first = Instant::now() + period;
        let handle = tokio::spawn(async move {
            let mut ticks = tokio::time::interval_at(first, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                match shared.tick() {
                    Some(TickOutcome::TimedOut) => {
                        tracing::debug!("question timed out");
                    }
                    Some(_) => {}
                    None => break,
                }
            }
        });
        Self { handle }
    }

    /// Cancels the countdown. Idempotent.
    pub(crate) fn stop(&self) {
        self.handle.abort();
    }

    #[must_use]
    pub(crate) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
