use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use quiz_core::model::{Question, SessionResult};
use quiz_core::{SessionEngine, SessionPhase, TickOutcome};
use tokio::sync::watch;

use super::timer::SessionTimer;
use super::view::SessionSnapshot;
use crate::Clock;

/// Engine plus its change feed, shared between the loop service and the timer task.
pub(crate) struct SharedSession {
    engine: Mutex<SessionEngine>,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl SharedSession {
    fn new(engine: SessionEngine) -> Self {
        let (snapshots, _) = watch::channel(SessionSnapshot::of(&engine));
        Self {
            engine: Mutex::new(engine),
            snapshots,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionEngine> {
        // a poisoned lock still guards a consistent engine
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `f` to the engine and publishes the resulting state.
    fn update<T>(&self, f: impl FnOnce(&mut SessionEngine) -> T) -> T {
        let mut engine = self.lock();
        let out = f(&mut engine);
        self.snapshots.send_replace(SessionSnapshot::of(&engine));
        out
    }

    /// One timer tick. `None` once there is nothing left to count down.
    pub(crate) fn tick(&self) -> Option<TickOutcome> {
        let mut engine = self.lock();
        match engine.phase() {
            SessionPhase::NotStarted | SessionPhase::Over => None,
            SessionPhase::FeedbackShown => Some(TickOutcome::Ignored),
            SessionPhase::Playing => {
                let outcome = engine.tick();
                self.snapshots.send_replace(SessionSnapshot::of(&engine));
                Some(outcome)
            }
        }
    }
}

/// Runs a quiz session against a one-second countdown.
///
/// Owns the engine and the timer task: `start` and every `advance` onto a new question
/// spawn the countdown, and `reset`, the final `advance`, and dropping the service
/// cancel it. Front ends read state through
/// [`snapshot`](Self::snapshot) or follow it with [`subscribe`](Self::subscribe).
pub struct SessionLoopService {
    clock: Clock,
    tick_period: Duration,
    shared: Arc<SharedSession>,
    timer: Option<SessionTimer>,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(clock: Clock, questions: Vec<Question>, default_time_secs: u32) -> Self {
        Self {
            clock,
            tick_period: Duration::from_secs(1),
            shared: Arc::new(SharedSession::new(SessionEngine::new(
                questions,
                default_time_secs,
            ))),
            timer: None,
        }
    }

    #[must_use]
    pub fn with_tick_period(mut self, tick_period: Duration) -> Self {
        self.tick_period = tick_period;
        self
    }

    /// Starts a fresh attempt and its countdown.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        self.stop_timer();
        let now = self.clock.now();
        let phase = self.shared.update(|engine| {
            engine.start(now);
            engine.phase()
        });
        tracing::debug!(
            total = self.shared.lock().total_questions(),
            "quiz session started"
        );
        if phase == SessionPhase::Playing {
            self.spawn_timer();
        }
    }

    /// Records the player's pick. `false` if no pick is accepted right now.
    pub fn submit_answer(&mut self, index: usize) -> bool {
        self.shared.update(|engine| engine.submit_answer(index))
    }

    /// Scores the shown answer and moves on. `false` if no feedback is shown.
    ///
    /// The next question gets a fresh countdown whose first tick lands a full period
    /// after this call.
    pub fn advance(&mut self) -> bool {
        let now = self.clock.now();
        let (advanced, over) = self
            .shared
            .update(|engine| (engine.advance(now), engine.is_over()));
        if over {
            self.stop_timer();
            tracing::debug!("quiz session over");
        } else if advanced {
            self.spawn_timer();
        }
        advanced
    }

    /// Cancels the countdown and returns to the not-started state.
    pub fn reset(&mut self) {
        self.stop_timer();
        self.shared.update(SessionEngine::reset);
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::of(&self.shared.lock())
    }

    /// Change feed of snapshots, updated on every tick and action.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.shared.snapshots.subscribe()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.shared.lock().phase()
    }

    #[must_use]
    pub fn result(&self) -> SessionResult {
        self.shared.lock().result()
    }

    /// Whether the countdown task is currently alive.
    #[must_use]
    pub fn is_timer_running(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn spawn_timer(&mut self) {
        self.stop_timer();
        self.timer = Some(SessionTimer::spawn(
            Arc::clone(&self.shared),
            self.tick_period,
        ));
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop();
        }
    }
}
