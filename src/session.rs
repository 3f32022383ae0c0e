use crate::models::RunState;
use chrono::{DateTime, Duration, Local};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionState {
    pub run_state: RunState,
    pub started_at: Option<DateTime<Local>>,
    pub ended_at: Option<DateTime<Local>>,
    pub generation: u64,
}

/// Process-wide run state shared between the panel and the jiggler loop.
///
/// `started_at` is kept after a run ends, so an idle panel still reports the
/// last session's runtime, frozen at `ended_at`.
#[derive(Debug, Default)]
pub struct Session {
    state: Mutex<SessionState>,
    stop: AtomicBool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves Idle to Running and returns the new run's generation, or `None`
    /// if a run is already active.
    pub fn try_begin(&self, now: DateTime<Local>) -> Option<u64> {
        let mut state = self.state.lock();
        if state.run_state == RunState::Running {
            return None;
        }
        state.run_state = RunState::Running;
        state.started_at = Some(now);
        state.ended_at = None;
        state.generation += 1;
        self.stop.store(false, Ordering::SeqCst);
        Some(state.generation)
    }

    /// Raises the stop signal and marks the session idle. Returns false when
    /// nothing was running.
    pub fn request_stop(&self, now: DateTime<Local>) -> bool {
        let mut state = self.state.lock();
        if state.run_state != RunState::Running {
            return false;
        }
        self.stop.store(true, Ordering::SeqCst);
        state.run_state = RunState::Idle;
        state.ended_at = Some(now);
        true
    }

    /// Ends the run with `generation` without raising the stop signal. Runs
    /// from older generations are ignored.
    pub fn finish(&self, generation: u64, now: DateTime<Local>) -> bool {
        let mut state = self.state.lock();
        if state.generation != generation || state.run_state != RunState::Running {
            return false;
        }
        state.run_state = RunState::Idle;
        state.ended_at = Some(now);
        true
    }

    /// Whether the loop launched as `generation` should keep going.
    pub fn is_active(&self, generation: u64) -> bool {
        if self.stop_requested() {
            return false;
        }
        let state = self.state.lock();
        state.run_state == RunState::Running && state.generation == generation
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    pub fn run_state(&self) -> RunState {
        self.state.lock().run_state
    }

    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.state.lock().started_at
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> SessionState {
        *self.state.lock()
    }

    /// Elapsed time of the current or most recent run; zero if there was none.
    pub fn runtime(&self, now: DateTime<Local>) -> Duration {
        let state = self.state.lock();
        let Some(started_at) = state.started_at else {
            return Duration::zero();
        };
        let until = match state.run_state {
            RunState::Running => now,
            RunState::Idle => state.ended_at.unwrap_or(now),
        };
        (until - started_at).max(Duration::zero())
    }
}
