use std::time::Duration;

use super::command::Command;
use crate::events::Envelope;

/// A side effect described by a command and executed by the engine loop.
///
/// Commands stay deterministic by returning descriptions instead of doing
/// I/O; the loop stamps timestamps, serializes, and talks to the broker.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Publish an event on the outbound topic, keyed by game id. The
    /// envelope's timestamp is stamped at execution time.
    Publish(Envelope),

    /// Re-enqueue `command` after `delay`.
    ScheduleTimer {
        delay: Duration,
        command: Box<Command>,
    },
}
