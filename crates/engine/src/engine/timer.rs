use std::sync::Mutex;
use std::time::Duration;

use game_core::Phase;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::command::Command;

/// The timeout for a phase, zero meaning "no timer".
///
/// Waiting has no deadline (players join until the game starts) and Ended is
/// terminal.
pub fn phase_timeout(phase: Phase, night: Duration, day: Duration, voting: Duration) -> Duration {
    match phase {
        Phase::Night => night,
        Phase::Day => day,
        Phase::Voting => voting,
        Phase::Waiting | Phase::Ended => Duration::ZERO,
    }
}

struct ActiveTimer {
    tag: String,
    handle: JoinHandle<()>,
}

/// Tracks the single phase-timeout timer.
///
/// Touched from the engine loop and (indirectly) from fired timer tasks, so
/// the slot sits behind a mutex. A phase that advances manually must cancel
/// the outstanding timer before arming the next, otherwise two phase
/// changes race.
#[derive(Default)]
pub struct TimerManager {
    active: Mutex<Option<ActiveTimer>>,
}

impl TimerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels any active timer, then arms one that enqueues
    /// `PhaseChange(next)` after `duration`.
    ///
    /// The fired task blocks on a full command queue rather than dropping
    /// the transition, bailing out only if the engine is shutting down.
    pub fn schedule(
        &self,
        current: Phase,
        round: u32,
        duration: Duration,
        next: Phase,
        command_tx: mpsc::Sender<Command>,
        cancel: CancellationToken,
    ) {
        let tag = format!("{current}-round-{round}");
        let task_tag = tag.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(duration) => {}
            }

            tokio::select! {
                result = command_tx.send(Command::PhaseChange { next }) => match result {
                    Ok(()) => {
                        debug!(timer = %task_tag, next = %next, "phase timeout fired");
                    }
                    Err(_) => {
                        warn!(timer = %task_tag, "phase timeout fired but engine loop is gone");
                    }
                },
                _ = cancel.cancelled() => {
                    debug!(timer = %task_tag, "phase timeout dropped during shutdown");
                }
            }
        });

        let mut active = self.active.lock().expect("timer slot poisoned");
        if let Some(previous) = active.take() {
            previous.handle.abort();
        }
        debug!(timer = %tag, duration_secs = duration.as_secs(), next = %next, "scheduled phase timeout");
        *active = Some(ActiveTimer { tag, handle });
    }

    /// Stops the active timer if any. Safe to call repeatedly.
    pub fn cancel(&self) {
        let mut active = self.active.lock().expect("timer slot poisoned");
        if let Some(timer) = active.take() {
            timer.handle.abort();
            debug!(timer = %timer.tag, "cancelled phase timeout");
        }
    }

    /// Stops all timers during engine shutdown. Idempotent.
    pub fn shutdown(&self) {
        self.cancel();
    }

    pub fn is_armed(&self) -> bool {
        self.active.lock().expect("timer slot poisoned").is_some()
    }

    /// Tag of the active timer, e.g. `"night-round-2"`. For logs and tests.
    pub fn active_tag(&self) -> Option<String> {
        self.active
            .lock()
            .expect("timer slot poisoned")
            .as_ref()
            .map(|timer| timer.tag.clone())
    }
}
