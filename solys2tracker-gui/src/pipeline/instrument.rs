//! Workers that talk to the instrument.
//!
//! Each worker runs in its own thread and reports back through an
//! [`AppMessage`]. Tracking and sweeps additionally stream `ControlEvent`s
//! through the sender they are given.

use std::sync::mpsc::Sender;

use log::{error, info};
use solys2tracker_control::{
    read_adjustment, run_sweep, run_track, send_adjustment, try_connect, CancelToken,
    EventSender, MeasurementPoint, Result as ControlResult,
};
use solys2tracker_core::{ConnectionParams, Offset, SessionStatus, SweepKind, SweepPlan, TrackPlan};
use solys2tracker_proto::DEFAULT_TIMEOUT;

use crate::message::AppMessage;

/// What an operation worker runs.
#[derive(Debug, Clone)]
pub enum OperationPlan {
    Track(TrackPlan),
    Sweep(SweepPlan, SweepKind),
}

/// Checks the connection parameters.
pub fn connect_worker(params: &ConnectionParams, tx: &Sender<AppMessage>) {
    let outcome = try_connect(params, DEFAULT_TIMEOUT);
    let _ = tx.send(AppMessage::ConnectResult(outcome));
}

pub fn read_adjustment_worker(params: &ConnectionParams, tx: &Sender<AppMessage>) {
    let message = match read_adjustment(params) {
        Ok(adjustment) => AppMessage::AdjustmentLoaded(adjustment),
        Err(e) => AppMessage::AdjustError(e.to_string()),
    };
    let _ = tx.send(message);
}

/// Adds `step` to the instrument adjustment and reports the new value.
pub fn send_adjustment_worker(params: &ConnectionParams, step: Offset, tx: &Sender<AppMessage>) {
    let message = match send_adjustment(params, step) {
        Ok(current) => AppMessage::AdjustmentSent(current),
        Err(e) => AppMessage::AdjustError(e.to_string()),
    };
    let _ = tx.send(message);
}

/// Runs a tracking or sweep operation until it ends or is cancelled.
///
/// Captures are taken by the operator on the ASD software during each
/// countdown; the hook only posts the point to the event log.
pub fn operation_worker(
    status: &SessionStatus,
    plan: &OperationPlan,
    height: f64,
    events: &EventSender,
    cancel: &CancelToken,
    tx: &Sender<AppMessage>,
) {
    let result = match plan {
        OperationPlan::Track(plan) => run_track(status, plan, height, None, events, cancel),
        OperationPlan::Sweep(plan, kind) => {
            let hook_events = events.clone();
            let mut hook = move |point: &MeasurementPoint| -> ControlResult<()> {
                hook_events.info(format!(
                    "Point {}/{} measured at offset ({:+.3}, {:+.3}).",
                    point.index + 1,
                    point.total,
                    point.offset.azimuth,
                    point.offset.zenith
                ));
                Ok(())
            };
            run_sweep(status, plan, *kind, height, &mut hook, events, cancel)
        }
    };
    let message = match result {
        Ok(summary) => {
            info!(
                "Operation ended: {} completed, {} skipped, {} failed",
                summary.completed, summary.skipped, summary.failed_ticks
            );
            AppMessage::OperationComplete(summary)
        }
        Err(e) => {
            error!("Operation failed: {e}");
            AppMessage::OperationError(e.to_string())
        }
    };
    let _ = tx.send(message);
}
