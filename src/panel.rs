use crate::error::PanelError;
use crate::jiggler::{Jiggler, Outcome, POLL_INTERVAL};
use crate::models::{PanelEvent, PanelView, Plan, RunState, Trigger};
use crate::session::Session;
use crate::system::Cursor;
use crate::utils::{format_clock, format_runtime};
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration as StdDuration;
use tracing::{error, info};

pub const STATUS_IDLE: &str = "Click Start to begin.";
pub const STATUS_RUNNING: &str = "Jiggler is running.";
pub const STATUS_STOPPED: &str = "Jiggler stopped.";

/// Turns panel events into session transitions and display strings.
pub struct ControlPanel<C> {
    session: Arc<Session>,
    cursor: C,
    poll_interval: StdDuration,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<C> ControlPanel<C>
where
    C: Cursor + Clone + Send + 'static,
{
    pub fn new(session: Arc<Session>, cursor: C) -> Self {
        Self {
            session,
            cursor,
            poll_interval: POLL_INTERVAL,
            worker: Mutex::new(None),
        }
    }

    #[cfg(test)]
    pub fn with_poll_interval(mut self, poll_interval: StdDuration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    #[cfg(test)]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn handle(&self, event: &PanelEvent) -> Result<PanelView, PanelError> {
        self.handle_at(event, Local::now())
    }

    pub fn handle_at(
        &self,
        event: &PanelEvent,
        now: DateTime<Local>,
    ) -> Result<PanelView, PanelError> {
        let Some(trigger) = event.trigger else {
            return Ok(view(STATUS_IDLE, String::new(), String::new()));
        };

        let running = self.session.run_state() == RunState::Running;
        match trigger {
            Trigger::Start if !running => {
                let plan = Plan::new(event.frequency, event.duration)?;
                self.launch(plan, now)?;
                Ok(self.running_view(now))
            }
            Trigger::Start => Ok(self.running_view(now)),
            Trigger::Stop if running => {
                self.session.request_stop(now);
                info!(runtime = %format_runtime(self.session.runtime(now)), "jiggler stopped");
                Ok(view(
                    STATUS_STOPPED,
                    String::new(),
                    runtime_text(&self.session, now),
                ))
            }
            _ => Ok(self.status_at(now)),
        }
    }

    /// The view a plain refresh produces.
    pub fn status_at(&self, now: DateTime<Local>) -> PanelView {
        let status = match self.session.run_state() {
            RunState::Running => STATUS_RUNNING,
            RunState::Idle => STATUS_IDLE,
        };
        view(status, clock_text(now), runtime_text(&self.session, now))
    }

    /// Stops any active run and waits for the worker thread to exit.
    pub fn shutdown(&self) {
        self.session.request_stop(Local::now());
        self.join_worker();
    }

    pub fn join_worker(&self) {
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("jiggler thread panicked");
            }
        }
    }

    fn launch(&self, plan: Plan, now: DateTime<Local>) -> Result<(), PanelError> {
        let Some(generation) = self.session.try_begin(now) else {
            return Ok(());
        };

        let jiggler = Jiggler::new(self.session.clone(), plan, generation)
            .with_poll_interval(self.poll_interval);
        let mut cursor = self.cursor.clone();
        let spawned = thread::Builder::new()
            .name(format!("jiggler-{}", generation))
            .spawn(move || match jiggler.run(&mut cursor) {
                Ok(Outcome::Completed) | Ok(Outcome::Stopped) => {}
                Err(err) => error!("jiggler loop terminated: {:#}", err),
            });

        match spawned {
            Ok(handle) => {
                info!(
                    generation,
                    frequency_secs = plan.frequency_secs,
                    duration = %humantime::format_duration(
                        plan.duration.to_std().unwrap_or_default()
                    ),
                    "jiggler started"
                );
                // A previous run may still be finishing its last sleep; it
                // exits on its own once it sees the newer generation.
                *self.worker.lock() = Some(handle);
                Ok(())
            }
            Err(err) => {
                self.session.finish(generation, now);
                Err(PanelError::Spawn(err))
            }
        }
    }

    fn running_view(&self, now: DateTime<Local>) -> PanelView {
        view(
            STATUS_RUNNING,
            clock_text(now),
            runtime_text(&self.session, now),
        )
    }
}

fn view(status: &str, current_time: String, runtime: String) -> PanelView {
    PanelView {
        status: status.to_string(),
        current_time,
        runtime,
    }
}

fn clock_text(now: DateTime<Local>) -> String {
    format!("Current Time: {}", format_clock(now))
}

fn runtime_text(session: &Session, now: DateTime<Local>) -> String {
    format!("Runtime: {}", format_runtime(session.runtime(now)))
}
