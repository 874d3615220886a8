//! Operations over a fresh TCP connection, as started from the UI.

use chrono::Utc;
use solys2tracker_core::{SessionStatus, SweepKind, SweepPlan, TrackPlan};
use solys2tracker_io::SessionLogWriter;
use solys2tracker_proto::{Solys2Client, DEFAULT_TIMEOUT};

use crate::{
    build_ephemeris, observer_from_device, CancelToken, ControlEvent, EventSender,
    MeasurementHook, OperationSummary, Result, Session,
};

type TcpSession = Session<Solys2Client, crate::TrackerEphemeris>;

fn open_session(
    status: &SessionStatus,
    height: f64,
    log: SessionLogWriter,
    events: &EventSender,
    cancel: &CancelToken,
) -> Result<TcpSession> {
    let ephemeris = build_ephemeris(&status.kernels_path);
    let mut client = Solys2Client::connect(status.params(), DEFAULT_TIMEOUT)?;
    let observer = observer_from_device(&mut client, height)?;
    events.info(format!(
        "Observer at lat {:.4}, lon {:.4}, {:.0} m.",
        observer.latitude, observer.longitude, observer.height
    ));
    Ok(Session::new(client, ephemeris, observer)
        .with_events(events.clone())
        .with_cancel(cancel.clone())
        .with_log(log))
}

fn report<T>(events: &EventSender, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        events.send(ControlEvent::Failed(e.to_string()));
    }
    result
}

/// Tracks `plan.body` until cancelled or `max_ticks` updates are done.
pub fn run_track(
    status: &SessionStatus,
    plan: &TrackPlan,
    height: f64,
    max_ticks: Option<usize>,
    events: &EventSender,
    cancel: &CancelToken,
) -> Result<OperationSummary> {
    let result = (|| -> Result<OperationSummary> {
        plan.validate()?;
        let log = SessionLogWriter::create(&status.logfolder, plan.body, "track", Utc::now())?;
        open_session(status, height, log, events, cancel)?.track(plan, max_ticks)
    })();
    report(events, result)
}

/// Runs a Cross or Mesh sweep.
pub fn run_sweep(
    status: &SessionStatus,
    plan: &SweepPlan,
    kind: SweepKind,
    height: f64,
    hook: &mut dyn MeasurementHook,
    events: &EventSender,
    cancel: &CancelToken,
) -> Result<OperationSummary> {
    let result = (|| -> Result<OperationSummary> {
        plan.validate()?;
        let log =
            SessionLogWriter::create(&status.logfolder, plan.body, kind.as_str(), Utc::now())?;
        open_session(status, height, log, events, cancel)?.sweep(plan, kind, hook)
    })();
    report(events, result)
}
