//! Session status shared between the front ends and the worker threads.

use std::path::PathBuf;

/// Default Solys2 TCP port.
pub const DEFAULT_PORT: u16 = 15000;
/// Factory password of the Solys2.
pub const DEFAULT_PASSWORD: &str = "solys";
/// Default SPICE kernels directory.
pub const DEFAULT_KERNELS_PATH: &str = "./kernels";

/// Parameters needed to open a connection with the Solys2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub ip: String,
    pub port: u16,
    pub password: String,
}

impl ConnectionParams {
    #[must_use]
    pub fn new(ip: impl Into<String>, port: u16, password: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            port,
            password: password.into(),
        }
    }

    /// `ip:port` address string.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            ip: String::new(),
            port: DEFAULT_PORT,
            password: DEFAULT_PASSWORD.to_string(),
        }
    }
}

/// Current state of the application session with the Solys2.
///
/// `is_connected` is only true after a connection attempt with the current
/// parameters has succeeded. Changing the parameters through
/// [`SessionStatus::set_params`] clears it.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    params: ConnectionParams,
    is_connected: bool,
    pub logfolder: PathBuf,
    pub kernels_path: PathBuf,
}

impl SessionStatus {
    /// Builds a status from optionally persisted values, falling back to
    /// the defaults for whatever is missing or empty.
    #[must_use]
    pub fn with_defaults(
        ip: Option<String>,
        port: Option<u16>,
        password: Option<String>,
        logfolder: Option<PathBuf>,
        kernels_path: Option<PathBuf>,
    ) -> Self {
        let non_empty = |s: Option<String>| s.filter(|s| !s.is_empty());
        let non_empty_path = |p: Option<PathBuf>| p.filter(|p| !p.as_os_str().is_empty());
        Self {
            params: ConnectionParams {
                ip: ip.unwrap_or_default(),
                port: port.unwrap_or(DEFAULT_PORT),
                password: non_empty(password).unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
            },
            is_connected: false,
            logfolder: non_empty_path(logfolder).unwrap_or_else(|| PathBuf::from(".")),
            kernels_path: non_empty_path(kernels_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_KERNELS_PATH)),
        }
    }

    #[must_use]
    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.is_connected
    }

    /// Replaces the connection parameters. Marks the session as
    /// disconnected if anything changed.
    pub fn set_params(&mut self, params: ConnectionParams) {
        if params != self.params {
            self.params = params;
            self.is_connected = false;
        }
    }

    /// Records the outcome of a connection attempt made with `params`.
    ///
    /// The result is ignored if the parameters changed while the attempt
    /// was in flight.
    pub fn record_attempt(&mut self, params: &ConnectionParams, success: bool) {
        if *params == self.params {
            self.is_connected = success;
        }
    }
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self::with_defaults(None, None, None, None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let status = SessionStatus::default();
        assert_eq!(status.params().port, 15000);
        assert_eq!(status.params().password, "solys");
        assert_eq!(status.logfolder, PathBuf::from("."));
        assert_eq!(status.kernels_path, PathBuf::from("./kernels"));
        assert!(!status.is_connected());
    }

    #[test]
    fn test_empty_values_fall_back() {
        let status = SessionStatus::with_defaults(
            Some("10.0.0.2".into()),
            None,
            Some(String::new()),
            Some(PathBuf::new()),
            None,
        );
        assert_eq!(status.params().ip, "10.0.0.2");
        assert_eq!(status.params().password, "solys");
        assert_eq!(status.logfolder, PathBuf::from("."));
    }

    #[test]
    fn test_changing_params_disconnects() {
        let mut status = SessionStatus::default();
        let params = ConnectionParams::new("192.168.1.10", 15000, "solys");
        status.set_params(params.clone());
        status.record_attempt(&params, true);
        assert!(status.is_connected());

        // same params: stays connected
        status.set_params(params.clone());
        assert!(status.is_connected());

        status.set_params(ConnectionParams::new("192.168.1.11", 15000, "solys"));
        assert!(!status.is_connected());

        // stale attempt result is ignored
        status.record_attempt(&params, true);
        assert!(!status.is_connected());
    }

    #[test]
    fn test_address() {
        let params = ConnectionParams::new("10.1.1.1", 15001, "x");
        assert_eq!(params.address(), "10.1.1.1:15001");
    }
}
