//! Ephemeris error types.

use thiserror::Error;

/// Result type alias for ephemeris operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Ephemeris error types.
#[derive(Error, Debug)]
pub enum Error {
    /// Time outside the validity range of the series.
    #[error("time out of range: JD {0}")]
    TimeOutOfRange(f64),

    /// A computation produced a non-finite value.
    #[error("non-finite result computing {0}")]
    NonFinite(&'static str),

    /// Leapseconds kernel could not be parsed.
    #[error("invalid leapseconds kernel: {0}")]
    InvalidKernel(String),

    /// I/O error reading a kernel.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Core library error.
    #[error("core error: {0}")]
    Core(#[from] solys2tracker_core::Error),
}
