//! Tracking and sweep loops.
//!
//! A [`Session`] owns a [`Positioner`] and an [`EphemerisProvider`] and runs
//! one operation at a time on them. The loops never hold the instrument in
//! a wait longer than the cancellation poll, so a stop request takes effect
//! within about 100 ms.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use log::{info, warn};
use solys2tracker_core::{Observer, Offset, Position, SweepKind, SweepPlan, TrackPlan};
use solys2tracker_ephem::EphemerisProvider;
use solys2tracker_io::{LogRecord, SessionLogWriter};
use solys2tracker_proto::{Error as ProtoError, Positioner};

use crate::{CancelToken, ControlEvent, Error, EventSender, Result};

/// Highest zenith the instrument is sent to.
const MAX_ZENITH: f64 = 90.0;

const SECOND: Duration = Duration::from_secs(1);

/// Sweep point handed to a [`MeasurementHook`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementPoint {
    pub kind: SweepKind,
    pub index: usize,
    pub total: usize,
    pub offset: Offset,
    pub target: Position,
    pub time: DateTime<Utc>,
}

/// Called at every sweep point once the measurement window has elapsed.
pub trait MeasurementHook {
    fn measure(&mut self, point: &MeasurementPoint) -> Result<()>;
}

impl<F> MeasurementHook for F
where
    F: FnMut(&MeasurementPoint) -> Result<()>,
{
    fn measure(&mut self, point: &MeasurementPoint) -> Result<()> {
        self(point)
    }
}

/// Hook that only logs the point; captures are taken by the operator.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogHook;

impl MeasurementHook for LogHook {
    fn measure(&mut self, point: &MeasurementPoint) -> Result<()> {
        info!(
            "{} point {}/{} at offset ({:+.3}, {:+.3}) measured",
            point.kind,
            point.index + 1,
            point.total,
            point.offset.azimuth,
            point.offset.zenith
        );
        Ok(())
    }
}

/// What an operation did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationSummary {
    /// Moves (tracking) or measured points (sweeps) completed.
    pub completed: usize,
    /// Targets skipped below the horizon.
    pub skipped: usize,
    /// Tracking ticks lost to ephemeris or instrument errors.
    pub failed_ticks: usize,
    pub cancelled: bool,
    pub log_path: Option<PathBuf>,
}

/// Instrument, ephemeris and observer an operation runs against.
pub struct Session<P, E> {
    positioner: P,
    ephemeris: E,
    observer: Observer,
    events: EventSender,
    cancel: CancelToken,
    log: Option<SessionLogWriter>,
}

impl<P: Positioner, E: EphemerisProvider> Session<P, E> {
    pub fn new(positioner: P, ephemeris: E, observer: Observer) -> Self {
        Self {
            positioner,
            ephemeris,
            observer,
            events: EventSender::silent(),
            cancel: CancelToken::new(),
            log: None,
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = events;
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn with_log(mut self, log: SessionLogWriter) -> Self {
        self.log = Some(log);
        self
    }

    #[must_use]
    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    pub fn into_positioner(self) -> P {
        self.positioner
    }

    fn summary(&self) -> OperationSummary {
        OperationSummary {
            log_path: self.log.as_ref().map(|l| l.path().to_path_buf()),
            ..OperationSummary::default()
        }
    }

    fn record(
        &mut self,
        index: usize,
        offset: Offset,
        target: Position,
        measured: Option<Position>,
    ) -> Result<()> {
        if let Some(log) = &mut self.log {
            log.write_record(&LogRecord {
                time: Utc::now(),
                index,
                offset,
                target,
                measured,
            })?;
        }
        self.events.send(ControlEvent::Moved {
            index,
            offset,
            target,
            measured,
        });
        Ok(())
    }

    fn read_back(&mut self) -> Option<Position> {
        match self.positioner.current_position() {
            Ok(p) => Some(p),
            Err(e) => {
                warn!("Could not read the current position: {e}");
                None
            }
        }
    }

    /// Keeps the instrument on `plan.body` until cancelled, or for
    /// `max_ticks` updates.
    ///
    /// A tick whose ephemeris fails, or that the instrument rejects, is
    /// reported as a warning and the loop goes on. Transport errors end the
    /// operation.
    pub fn track(
        &mut self,
        plan: &TrackPlan,
        max_ticks: Option<usize>,
    ) -> Result<OperationSummary> {
        plan.validate()?;
        let mut summary = self.summary();
        info!(
            "Tracking {} every {:?} with drift ({:+.3}, {:+.3})",
            plan.body, plan.interval, plan.drift.azimuth, plan.drift.zenith
        );
        self.events.info(format!("Tracking the {}.", plan.body));

        let mut index = 0;
        loop {
            if self.cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }
            let tick = Instant::now();
            match self.ephemeris.position(plan.body, &self.observer, Utc::now()) {
                Err(e) => {
                    summary.failed_ticks += 1;
                    warn!("Ephemeris failed at tick {index}: {e}");
                    self.events
                        .warning(format!("Could not compute the {} position: {e}", plan.body));
                }
                Ok(body) => {
                    let target = body - plan.drift;
                    if target.zenith > MAX_ZENITH {
                        summary.skipped += 1;
                        self.events.send(ControlEvent::Skipped { index, target });
                    } else {
                        match self.positioner.set_position(target) {
                            Ok(()) => {
                                let measured = self.read_back();
                                self.record(index, Offset::ZERO, target, measured)?;
                                summary.completed += 1;
                            }
                            Err(e @ ProtoError::Device { .. }) => {
                                summary.failed_ticks += 1;
                                warn!("Move rejected at tick {index}: {e}");
                                self.events.warning(format!("Move rejected: {e}"));
                            }
                            Err(e) => return Err(e.into()),
                        }
                    }
                }
            }
            index += 1;
            if max_ticks.is_some_and(|max| index >= max) {
                break;
            }
            if !self.cancel.sleep(plan.interval.saturating_sub(tick.elapsed())) {
                summary.cancelled = true;
                break;
            }
        }

        if summary.cancelled {
            info!("Tracking cancelled after {index} ticks");
            self.events.send(ControlEvent::Cancelled);
        } else {
            self.events.send(ControlEvent::Finished(format!(
                "Tracking finished after {} updates.",
                summary.completed
            )));
        }
        Ok(summary)
    }

    /// Runs a Cross or Mesh sweep, calling `hook` at every point.
    ///
    /// The body position is recomputed at each point so its motion during
    /// the sweep is followed. A point whose ephemeris fails is skipped with
    /// a warning. Cancelling stops before the next point and leaves the
    /// instrument where it is.
    pub fn sweep(
        &mut self,
        plan: &SweepPlan,
        kind: SweepKind,
        hook: &mut dyn MeasurementHook,
    ) -> Result<OperationSummary> {
        let points = plan.points(kind)?;
        let total = points.len();
        let mut summary = self.summary();
        info!(
            "{kind} of the {} with {total} points, at least {:?}",
            plan.body,
            plan.estimated_duration(kind)
        );
        self.events.info(format!(
            "Starting {kind} of the {}: {total} points, about {} s.",
            plan.body,
            plan.estimated_duration(kind).as_secs()
        ));

        for point in points {
            if self.cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }
            let index = point.index;
            self.events.send(ControlEvent::Progress { index, total });

            let now = Utc::now();
            let body = match self.ephemeris.position(plan.body, &self.observer, now) {
                Ok(body) => body,
                Err(e) => {
                    summary.failed_ticks += 1;
                    warn!("Ephemeris failed at {kind} point {index}: {e}");
                    self.events.warning(format!(
                        "Could not compute the {} position for point {index}, skipping it: {e}",
                        plan.body
                    ));
                    continue;
                }
            };
            let target = body + point.offset - plan.drift;
            if target.zenith > MAX_ZENITH {
                self.events.send(ControlEvent::Skipped { index, target });
                return Err(Error::BelowHorizon {
                    index,
                    zenith: target.zenith,
                });
            }
            self.positioner.set_position(target)?;
            let measured = self.read_back();

            if !self.countdown(index, plan.countdown) {
                summary.cancelled = true;
                break;
            }
            hook.measure(&MeasurementPoint {
                kind,
                index,
                total,
                offset: point.offset,
                target,
                time: now,
            })?;
            self.events.send(ControlEvent::Measured { index });
            self.record(index, point.offset, target, measured)?;
            summary.completed += 1;

            if !self.cancel.sleep(plan.rest) {
                summary.cancelled = true;
                break;
            }
        }

        if summary.cancelled {
            info!("{kind} cancelled after {} points", summary.completed);
            self.events.send(ControlEvent::Cancelled);
        } else if summary.failed_ticks > 0 {
            self.events.send(ControlEvent::Finished(format!(
                "{kind} finished with {} of {total} points skipped: the captures no longer \
                 cover the full sweep, repeat it before analysing.",
                summary.failed_ticks
            )));
        } else {
            self.events.send(ControlEvent::Finished(format!(
                "{kind} finished: load the {} ASD captures to analyse the {kind} and obtain the next drift.",
                summary.completed
            )));
        }
        Ok(summary)
    }

    /// Waits out a measurement window, reporting the time left every second.
    fn countdown(&self, index: usize, window: Duration) -> bool {
        let mut remaining = window;
        while !remaining.is_zero() {
            self.events
                .send(ControlEvent::Countdown { index, remaining });
            let chunk = remaining.min(SECOND);
            if !self.cancel.sleep(chunk) {
                return false;
            }
            remaining -= chunk;
        }
        true
    }
}
