//! Protocol error types.

use thiserror::Error;

/// Result type for protocol operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure codes reported by the instrument in a `NO <code>` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    /// Command code not recognised (1).
    UnknownCommand,
    /// Argument out of range or malformed (2).
    InvalidParameter,
    /// Password missing or wrong (3).
    NotAuthorised,
    /// Instrument busy, retry later (4).
    Busy,
    /// Any other code.
    Other(u16),
}

impl DeviceError {
    /// Maps a numeric failure code.
    #[must_use]
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => DeviceError::UnknownCommand,
            2 => DeviceError::InvalidParameter,
            3 => DeviceError::NotAuthorised,
            4 => DeviceError::Busy,
            other => DeviceError::Other(other),
        }
    }
}

impl std::fmt::Display for DeviceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceError::UnknownCommand => write!(f, "command not recognised"),
            DeviceError::InvalidParameter => write!(f, "invalid parameter"),
            DeviceError::NotAuthorised => write!(f, "not authorised (check the password)"),
            DeviceError::Busy => write!(f, "instrument busy"),
            DeviceError::Other(code) => write!(f, "error code {code}"),
        }
    }
}

/// Protocol error types.
#[derive(Error, Debug)]
pub enum Error {
    /// Socket I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No reply within the configured timeout.
    #[error("timed out waiting for the Solys2")]
    Timeout,

    /// The peer closed the connection.
    #[error("connection closed by the Solys2")]
    Closed,

    /// Address could not be resolved.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The instrument rejected the command.
    #[error("{command} rejected: {error}")]
    Device {
        command: &'static str,
        error: DeviceError,
    },

    /// The reply did not answer the command that was sent.
    #[error("unexpected reply to {expected}: {got:?}")]
    UnexpectedReply { expected: &'static str, got: String },

    /// A reply value could not be parsed.
    #[error("malformed reply: {0}")]
    Parse(String),
}

impl Error {
    /// Whether the error means the password was rejected.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Error::Device {
                error: DeviceError::NotAuthorised,
                ..
            }
        )
    }
}
