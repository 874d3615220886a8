//! Error types for solys2tracker-core.

use thiserror::Error;

/// Result type alias for solys2tracker operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for solys2tracker operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid observer coordinate.
    #[error("invalid observer location: lat {latitude}, lon {longitude}")]
    InvalidLocation { latitude: f64, longitude: f64 },

    /// Invalid sweep parameters.
    #[error("invalid sweep: {0}")]
    InvalidSweep(String),

    /// Not enough measurements to build a profile or grid.
    #[error("expected {expected} measurements, got {actual}")]
    MeasurementCount { expected: String, actual: usize },

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Unknown body name.
    #[error("unknown body: {0}")]
    UnknownBody(String),
}
