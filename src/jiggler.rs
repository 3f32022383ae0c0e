use crate::models::Plan;
use crate::session::Session;
use crate::system::Cursor;
use anyhow::{Context, Result};
use chrono::{DateTime, Local, Timelike};
use std::sync::Arc;
use std::thread;
use std::time::Duration as StdDuration;
use tracing::{debug, info};

/// Where every nudge starts, in screen coordinates.
pub const NUDGE_ORIGIN: (i32, i32) = (10, 10);
/// Relative move applied after jumping to the origin.
pub const NUDGE_OFFSET: (i32, i32) = (10, 10);

pub const POLL_INTERVAL: StdDuration = StdDuration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Continue,
    Deadline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Stopped,
}

/// Nudges fire when the wall-clock second is a multiple of the frequency, so
/// they stay phase-aligned to minute boundaries.
pub fn should_nudge(second: u32, frequency_secs: u32) -> bool {
    frequency_secs != 0 && second % frequency_secs == 0
}

pub fn nudge<C: Cursor + ?Sized>(cursor: &mut C) -> Result<()> {
    cursor.move_to(NUDGE_ORIGIN.0, NUDGE_ORIGIN.1)?;
    cursor.move_by(NUDGE_OFFSET.0, NUDGE_OFFSET.1)?;
    cursor.release_left()
}

/// One run of the nudging loop, bound to the session generation it was
/// launched with.
pub struct Jiggler {
    session: Arc<Session>,
    plan: Plan,
    generation: u64,
    poll_interval: StdDuration,
}

impl Jiggler {
    pub fn new(session: Arc<Session>, plan: Plan, generation: u64) -> Self {
        Self {
            session,
            plan,
            generation,
            poll_interval: POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: StdDuration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn tick<C: Cursor + ?Sized>(&self, cursor: &mut C, now: DateTime<Local>) -> Result<Tick> {
        if should_nudge(now.second(), self.plan.frequency_secs) {
            nudge(cursor).context("Failed to nudge the cursor")?;
            debug!(at = %now.format("%H:%M:%S"), "nudged cursor");
        }

        let Some(started_at) = self.session.started_at() else {
            return Ok(Tick::Continue);
        };
        // A stop that lands first wins; the loop then exits as stopped.
        if now - started_at >= self.plan.duration && self.session.finish(self.generation, now) {
            return Ok(Tick::Deadline);
        }
        Ok(Tick::Continue)
    }

    /// Blocks until the deadline passes, the session is stopped, or the
    /// cursor fails. A failure releases the session before returning.
    pub fn run<C: Cursor + ?Sized>(&self, cursor: &mut C) -> Result<Outcome> {
        while self.session.is_active(self.generation) {
            let now = Local::now();
            match self.tick(cursor, now) {
                Ok(Tick::Continue) => {}
                Ok(Tick::Deadline) => {
                    info!("Jiggling completed.");
                    return Ok(Outcome::Completed);
                }
                Err(err) => {
                    self.session.finish(self.generation, Local::now());
                    return Err(err);
                }
            }
            thread::sleep(self.poll_interval);
        }
        debug!(generation = self.generation, "jiggler stopped");
        Ok(Outcome::Stopped)
    }
}
