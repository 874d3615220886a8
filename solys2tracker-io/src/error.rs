//! I/O error types.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid file format.
    #[error("invalid file format in {path}, line {line}: {message}")]
    InvalidFormat {
        path: String,
        line: usize,
        message: String,
    },

    /// Settings (de)serialisation error.
    #[error("settings error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unknown key or unparsable value.
    #[error("invalid setting {key}: {message}")]
    InvalidSetting { key: String, message: String },

    /// No per-user configuration directory on this platform.
    #[error("no configuration directory available")]
    NoConfigDir,

    /// Folder contains no captures.
    #[error("no capture files in {0}")]
    EmptyFolder(PathBuf),

    /// Core library error.
    #[error("core error: {0}")]
    CoreError(#[from] solys2tracker_core::Error),

    /// Ephemeris error (leapseconds kernels).
    #[error("ephemeris error: {0}")]
    EphemError(#[from] solys2tracker_ephem::Error),
}
