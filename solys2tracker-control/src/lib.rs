//! solys2tracker-control: instrument operations for the Solys2.
//!
//! Every operation here blocks and is meant to run on a worker thread. Its
//! progress is reported as [`ControlEvent`]s on an `mpsc` channel and it
//! can be stopped through a shared [`CancelToken`].
//!
//! # Key Components
//!
//! - [`Session`] - Tracking and sweep loops over any [`Positioner`]
//! - [`run_track`] / [`run_sweep`] - Same loops over a fresh TCP connection
//! - [`try_connect`], [`read_adjustment`], [`send_adjustment`] - Short
//!   one-request operations
//!
//! [`Positioner`]: solys2tracker_proto::Positioner

mod cancel;
mod connection;
mod ephemeris;
mod error;
mod event;
mod operations;
mod session;

pub use cancel::CancelToken;
pub use connection::{
    go_home, instrument_info, read_adjustment, send_adjustment, try_connect,
    validate_adjustment_step, ConnectOutcome, InstrumentInfo, CONNECTED_MESSAGE,
    MAX_ADJUSTMENT_STEP,
};
pub use ephemeris::{build_ephemeris, observer_from_device, TrackerEphemeris};
pub use error::{Error, Result};
pub use event::{ControlEvent, EventSender};
pub use operations::{run_sweep, run_track};
pub use session::{LogHook, MeasurementHook, MeasurementPoint, OperationSummary, Session};
