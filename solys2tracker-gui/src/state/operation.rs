//! State of the instrument operation running in the background.

use std::sync::mpsc::Receiver;
use std::time::Duration;

use solys2tracker_control::{CancelToken, ControlEvent};
use solys2tracker_core::{Body, Position, SweepKind};

/// What the body tab starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationKind {
    #[default]
    Track,
    Cross,
    Mesh,
}

impl OperationKind {
    pub const ALL: [OperationKind; 3] = [
        OperationKind::Track,
        OperationKind::Cross,
        OperationKind::Mesh,
    ];

    pub fn sweep_kind(self) -> Option<SweepKind> {
        match self {
            OperationKind::Track => None,
            OperationKind::Cross => Some(SweepKind::Cross),
            OperationKind::Mesh => Some(SweepKind::Mesh),
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Track => write!(f, "Tracking"),
            OperationKind::Cross => write!(f, "Cross"),
            OperationKind::Mesh => write!(f, "Mesh"),
        }
    }
}

/// One line of the event log panel.
pub struct LogLine {
    pub text: String,
    pub warning: bool,
}

const MAX_LOG_LINES: usize = 500;

/// Background work flags, progress and the event log.
pub struct OperationState {
    /// Body and kind of the running operation, if any.
    pub running: Option<(Body, OperationKind)>,
    /// Events of the running operation.
    pub events: Option<Receiver<ControlEvent>>,
    pub cancel: CancelToken,
    /// Sweep progress in `[0, 1]`.
    pub progress: f32,
    pub point: Option<(usize, usize)>,
    pub countdown: Option<Duration>,
    pub last_target: Option<Position>,
    pub last_measured: Option<Position>,
    pub status_text: String,
    pub is_connecting: bool,
    pub is_adjusting: bool,
    pub is_analysing: bool,
    pub log: Vec<LogLine>,
}

impl Default for OperationState {
    fn default() -> Self {
        Self {
            running: None,
            events: None,
            cancel: CancelToken::new(),
            progress: 0.0,
            point: None,
            countdown: None,
            last_target: None,
            last_measured: None,
            status_text: "Ready".to_string(),
            is_connecting: false,
            is_adjusting: false,
            is_analysing: false,
            log: Vec::new(),
        }
    }
}

impl OperationState {
    /// True while any worker thread is running.
    pub fn is_busy(&self) -> bool {
        self.running.is_some() || self.is_connecting || self.is_adjusting || self.is_analysing
    }

    pub fn is_running(&self, body: Body) -> bool {
        self.running.is_some_and(|(b, _)| b == body)
    }

    /// Clears per-operation progress and installs a fresh cancel token.
    pub fn begin(&mut self, body: Body, kind: OperationKind, events: Receiver<ControlEvent>) {
        self.running = Some((body, kind));
        self.events = Some(events);
        self.cancel = CancelToken::new();
        self.progress = 0.0;
        self.point = None;
        self.countdown = None;
        self.last_target = None;
        self.last_measured = None;
        self.status_text = format!("{kind} of the {body} started");
    }

    /// Marks the operation as ended. Pending events are still drained.
    pub fn end(&mut self) {
        self.running = None;
        self.countdown = None;
    }

    pub fn push_log(&mut self, text: impl Into<String>, warning: bool) {
        self.log.push(LogLine {
            text: text.into(),
            warning,
        });
        if self.log.len() > MAX_LOG_LINES {
            let excess = self.log.len() - MAX_LOG_LINES;
            self.log.drain(..excess);
        }
    }

    /// Folds one operation event into the state.
    pub fn apply_event(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::Info(text) => {
                self.status_text.clone_from(&text);
                self.push_log(text, false);
            }
            ControlEvent::Warning(text) => self.push_log(text, true),
            ControlEvent::Progress { index, total } => {
                self.point = Some((index + 1, total));
                self.progress = crate::util::ratio(index, total);
                self.status_text = format!("Point {} of {total}", index + 1);
            }
            ControlEvent::Moved {
                index,
                target,
                measured,
                ..
            } => {
                self.last_target = Some(target);
                self.last_measured = measured;
                self.push_log(
                    format!(
                        "#{index}: moved to az {:.4}, ze {:.4}",
                        target.azimuth, target.zenith
                    ),
                    false,
                );
            }
            ControlEvent::Skipped { index, target } => self.push_log(
                format!(
                    "#{index}: skipped, zenith {:.2} is below the horizon",
                    target.zenith
                ),
                true,
            ),
            ControlEvent::Countdown { remaining, .. } => self.countdown = Some(remaining),
            ControlEvent::Measured { index } => {
                self.countdown = None;
                if let Some((_, total)) = self.point {
                    self.progress = crate::util::ratio(index + 1, total);
                }
            }
            ControlEvent::Finished(text) => {
                self.progress = 1.0;
                self.status_text.clone_from(&text);
                self.push_log(text, false);
            }
            ControlEvent::Cancelled => {
                self.status_text = "Stopped".to_string();
                self.push_log("Operation stopped.", false);
            }
            ControlEvent::Failed(text) => {
                self.status_text = format!("Error: {text}");
                self.push_log(text, true);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    #[test]
    fn test_progress_and_countdown() {
        let mut state = OperationState::default();
        let (_tx, rx) = channel();
        state.begin(Body::Moon, OperationKind::Cross, rx);
        state.apply_event(ControlEvent::Progress { index: 1, total: 4 });
        assert_eq!(state.point, Some((2, 4)));
        assert!((state.progress - 0.25).abs() < 1e-6);

        state.apply_event(ControlEvent::Countdown {
            index: 1,
            remaining: Duration::from_secs(3),
        });
        assert_eq!(state.countdown, Some(Duration::from_secs(3)));

        state.apply_event(ControlEvent::Measured { index: 1 });
        assert_eq!(state.countdown, None);
        assert!((state.progress - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_log_is_bounded() {
        let mut state = OperationState::default();
        for i in 0..(MAX_LOG_LINES + 20) {
            state.push_log(format!("line {i}"), false);
        }
        assert_eq!(state.log.len(), MAX_LOG_LINES);
        assert_eq!(state.log[0].text, "line 20");
    }

    #[test]
    fn test_busy_flags() {
        let mut state = OperationState::default();
        assert!(!state.is_busy());
        let (_tx, rx) = channel();
        state.begin(Body::Sun, OperationKind::Track, rx);
        assert!(state.is_running(Body::Sun));
        assert!(!state.is_running(Body::Moon));
        state.end();
        assert!(!state.is_busy());
        state.apply_event(ControlEvent::Failed("socket closed".into()));
        assert_eq!(state.status_text, "Error: socket closed");
        assert!(state.log.last().is_some_and(|l| l.warning));
    }
}
