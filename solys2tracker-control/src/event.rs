//! Progress events reported by running operations.

use std::sync::mpsc::Sender;
use std::time::Duration;

use solys2tracker_core::{Offset, Position};

/// Messages sent from an operation to whoever started it.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    /// Milestone worth showing to the user.
    Info(String),
    /// Recoverable problem; the operation goes on.
    Warning(String),
    /// Sweep progress: point `index` (from 0) of `total` is starting.
    Progress { index: usize, total: usize },
    /// Instrument moved.
    Moved {
        index: usize,
        offset: Offset,
        target: Position,
        measured: Option<Position>,
    },
    /// Target skipped because it is below the horizon.
    Skipped { index: usize, target: Position },
    /// Measurement window of the current point: time left.
    Countdown { index: usize, remaining: Duration },
    /// Measurement hook invoked for a point.
    Measured { index: usize },
    /// Operation ended normally. Carries the next step for the user.
    Finished(String),
    /// Operation stopped on request.
    Cancelled,
    /// Operation aborted.
    Failed(String),
}

/// Channel end operations report to. A dropped receiver is not an error:
/// the operation just runs unobserved.
#[derive(Debug, Clone)]
pub struct EventSender(Option<Sender<ControlEvent>>);

impl EventSender {
    #[must_use]
    pub fn new(tx: Sender<ControlEvent>) -> Self {
        Self(Some(tx))
    }

    /// Sender that discards everything.
    #[must_use]
    pub fn silent() -> Self {
        Self(None)
    }

    pub fn send(&self, event: ControlEvent) {
        if let Some(tx) = &self.0 {
            let _ = tx.send(event);
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.send(ControlEvent::Info(message.into()));
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.send(ControlEvent::Warning(message.into()));
    }
}

impl From<Sender<ControlEvent>> for EventSender {
    fn from(tx: Sender<ControlEvent>) -> Self {
        Self::new(tx)
    }
}
