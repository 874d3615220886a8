//! Control error types.

use thiserror::Error;

/// Result type for control operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Control error types.
#[derive(Error, Debug)]
pub enum Error {
    /// Instrument communication error.
    #[error("{0}")]
    Protocol(#[from] solys2tracker_proto::Error),

    /// Ephemeris error (both providers failed).
    #[error("ephemeris error: {0}")]
    Ephemeris(#[from] solys2tracker_ephem::Error),

    /// Log or settings I/O error.
    #[error("{0}")]
    Io(#[from] solys2tracker_io::Error),

    /// Invalid plan or location.
    #[error("{0}")]
    Core(#[from] solys2tracker_core::Error),

    /// A sweep point falls below the horizon.
    #[error("point {index} is below the horizon (zenith {zenith:.2}°)")]
    BelowHorizon { index: usize, zenith: f64 },

    /// Adjustment increment larger than the instrument allows per send.
    #[error("{axis} adjustment {value} is outside ±{max}°")]
    AdjustmentOutOfBounds {
        axis: &'static str,
        value: f64,
        max: f64,
    },

    /// Measurement hook failure.
    #[error("measurement failed: {0}")]
    Measurement(String),
}
