//! Short operations: each opens its own connection, does one thing and
//! closes it.

use std::time::Duration;

use log::{info, warn};
use solys2tracker_core::{ConnectionParams, Offset, Position};
use solys2tracker_proto::{Positioner, Solys2Client, DEFAULT_TIMEOUT};

use crate::{Error, Result};

/// Largest change the instrument adjustment accepts per axis in one send,
/// in degrees.
pub const MAX_ADJUSTMENT_STEP: f64 = 0.2;

/// Message reported by a successful [`try_connect`].
pub const CONNECTED_MESSAGE: &str = "Connected successfully.";

/// Result of a connection check, always reported rather than returned as
/// an error so the UI can show it as is.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectOutcome {
    /// Parameters the attempt was made with.
    pub params: ConnectionParams,
    pub success: bool,
    pub message: String,
}

/// Opens a connection, authenticates and closes it.
#[must_use]
pub fn try_connect(params: &ConnectionParams, timeout: Duration) -> ConnectOutcome {
    let result = Solys2Client::connect(params, timeout).and_then(|mut c| c.version());
    let (success, message) = match result {
        Ok(version) => {
            info!("Connected to Solys2 {} (firmware {version})", params.address());
            (true, CONNECTED_MESSAGE.to_string())
        }
        Err(e) => {
            warn!("Connection to {} failed: {e}", params.address());
            (false, e.to_string())
        }
    };
    ConnectOutcome {
        params: params.clone(),
        success,
        message,
    }
}

/// Snapshot of the instrument state.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentInfo {
    pub version: String,
    pub position: Position,
    pub planned: Position,
    pub adjustment: Offset,
    /// Latitude and longitude configured in the instrument.
    pub location: (f64, f64),
}

pub fn instrument_info(params: &ConnectionParams) -> Result<InstrumentInfo> {
    let mut client = Solys2Client::connect(params, DEFAULT_TIMEOUT)?;
    Ok(InstrumentInfo {
        version: client.version()?,
        position: client.current_position()?,
        planned: client.planned_position()?,
        adjustment: client.adjustment()?,
        location: client.location()?,
    })
}

/// Current azimuth and zenith adjustment.
pub fn read_adjustment(params: &ConnectionParams) -> Result<Offset> {
    let mut client = Solys2Client::connect(params, DEFAULT_TIMEOUT)?;
    Ok(client.adjustment()?)
}

/// Checks that an adjustment increment is finite and within
/// [`MAX_ADJUSTMENT_STEP`] on both axes.
pub fn validate_adjustment_step(step: Offset) -> Result<()> {
    for (axis, value) in [("azimuth", step.azimuth), ("zenith", step.zenith)] {
        if !value.is_finite() || value.abs() > MAX_ADJUSTMENT_STEP {
            return Err(Error::AdjustmentOutOfBounds {
                axis,
                value,
                max: MAX_ADJUSTMENT_STEP,
            });
        }
    }
    Ok(())
}

/// Adds `step` to the instrument adjustment, azimuth first, and returns the
/// adjustment the instrument reports afterwards.
///
/// The instrument accumulates each `AD` write into its stored adjustment,
/// so `step` is an increment, never the absolute value.
pub fn send_adjustment(params: &ConnectionParams, step: Offset) -> Result<Offset> {
    validate_adjustment_step(step)?;
    let mut client = Solys2Client::connect(params, DEFAULT_TIMEOUT)?;
    client.set_azimuth_adjustment(step.azimuth)?;
    client.set_zenith_adjustment(step.zenith)?;
    let current = client.adjustment()?;
    info!(
        "Adjustment changed by ({:+.4}, {:+.4}), now ({:+.4}, {:+.4})",
        step.azimuth, step.zenith, current.azimuth, current.zenith
    );
    Ok(current)
}

pub fn go_home(params: &ConnectionParams) -> Result<()> {
    let mut client = Solys2Client::connect(params, DEFAULT_TIMEOUT)?;
    client.home()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjustment_step_bounds() {
        assert!(validate_adjustment_step(Offset::new(0.2, -0.2)).is_ok());
        assert!(validate_adjustment_step(Offset::ZERO).is_ok());
        let err = validate_adjustment_step(Offset::new(0.05, -0.25)).unwrap_err();
        assert!(matches!(
            err,
            Error::AdjustmentOutOfBounds { axis: "zenith", .. }
        ));
        assert!(validate_adjustment_step(Offset::new(f64::NAN, 0.0)).is_err());
    }

    #[test]
    fn test_send_rejects_large_step_before_connecting() {
        // nothing listens on port 1; the bound check must fail first
        let params = ConnectionParams::new("127.0.0.1", 1, "solys");
        let err = send_adjustment(&params, Offset::new(5.0, 0.0)).unwrap_err();
        assert!(matches!(err, Error::AdjustmentOutOfBounds { axis: "azimuth", .. }));
    }
}
