//! solys2tracker-io: file I/O for solys2tracker.
//!
//! Persisted settings, ASD spectrometer exports, SPICE kernel directories
//! and CSV session logs.
//!

mod error;
pub mod kernels;
pub mod settings;
mod spectrum;
mod writer;

pub use error::{Error, Result};
pub use kernels::{KernelDirectory, KernelKind};
pub use settings::{SettingKey, Settings, SettingsStore};
pub use spectrum::{parse_asd, read_asd, read_capture_folder, Capture, ASD_HEADER_LINES};
pub use writer::{LogRecord, SessionLogWriter, SESSION_LOG_HEADER};
