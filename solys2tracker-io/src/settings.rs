//! Persisted local settings.
//!
//! A flat JSON object stored in the user configuration directory. Reads are
//! forgiving: a missing or corrupt file behaves as an empty store. Writes
//! re-read the file first so concurrent editors only lose the key they both
//! touched.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use solys2tracker_core::{ConnectionParams, SessionStatus};

use crate::{Error, Result};

const APP_DIR: &str = "solys2tracker";
const FILE_NAME: &str = "settings.json";

/// Known settings keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    Ip,
    Port,
    Password,
    Logfolder,
    KernelsPath,
    Height,
}

impl SettingKey {
    pub const ALL: [SettingKey; 6] = [
        SettingKey::Ip,
        SettingKey::Port,
        SettingKey::Password,
        SettingKey::Logfolder,
        SettingKey::KernelsPath,
        SettingKey::Height,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::Ip => "ip",
            SettingKey::Port => "port",
            SettingKey::Password => "password",
            SettingKey::Logfolder => "logfolder",
            SettingKey::KernelsPath => "kernels_path",
            SettingKey::Height => "height",
        }
    }

    /// Converts user text into the stored JSON value, validating numbers.
    pub fn parse_value(self, text: &str) -> Result<Value> {
        let invalid = |message: String| Error::InvalidSetting {
            key: self.as_str().to_string(),
            message,
        };
        match self {
            SettingKey::Port => text
                .trim()
                .parse::<u16>()
                .map(Value::from)
                .map_err(|e| invalid(format!("{text:?}: {e}"))),
            SettingKey::Height => {
                let height = text
                    .trim()
                    .parse::<f64>()
                    .map_err(|e| invalid(format!("{text:?}: {e}")))?;
                if height.is_finite() {
                    Ok(Value::from(height))
                } else {
                    Err(invalid("height must be finite".into()))
                }
            }
            _ => Ok(Value::from(text)),
        }
    }
}

impl std::fmt::Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SettingKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| Error::InvalidSetting {
                key: s.to_string(),
                message: "unknown key".into(),
            })
    }
}

/// Snapshot of the persisted settings.
///
/// Unknown keys are preserved so files written by newer versions survive a
/// round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings {
    values: BTreeMap<String, Value>,
}

impl Settings {
    /// Raw stored value.
    #[must_use]
    pub fn get(&self, key: SettingKey) -> Option<&Value> {
        self.values.get(key.as_str())
    }

    pub fn set(&mut self, key: SettingKey, value: Value) {
        self.values.insert(key.as_str().to_string(), value);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over every stored key, known or not.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn string(&self, key: SettingKey) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    #[must_use]
    pub fn ip(&self) -> Option<String> {
        self.string(SettingKey::Ip)
    }

    #[must_use]
    pub fn port(&self) -> Option<u16> {
        match self.get(SettingKey::Port)? {
            Value::Number(n) => n.as_u64().and_then(|p| u16::try_from(p).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn password(&self) -> Option<String> {
        self.string(SettingKey::Password)
    }

    #[must_use]
    pub fn logfolder(&self) -> Option<PathBuf> {
        self.string(SettingKey::Logfolder).map(PathBuf::from)
    }

    #[must_use]
    pub fn kernels_path(&self) -> Option<PathBuf> {
        self.string(SettingKey::KernelsPath).map(PathBuf::from)
    }

    /// Observer height above sea level, in metres.
    #[must_use]
    pub fn height(&self) -> Option<f64> {
        match self.get(SettingKey::Height)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Session state seeded from these settings.
    #[must_use]
    pub fn session_status(&self) -> SessionStatus {
        SessionStatus::with_defaults(
            self.ip(),
            self.port(),
            self.password(),
            self.logfolder(),
            self.kernels_path(),
        )
    }

    /// Stores the connection parameters of a successful connection.
    pub fn remember_connection(&mut self, params: &ConnectionParams) {
        self.set(SettingKey::Ip, Value::from(params.ip.as_str()));
        self.set(SettingKey::Port, Value::from(params.port));
        self.set(SettingKey::Password, Value::from(params.password.as_str()));
    }
}

/// Settings file location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store backed by an explicit file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location, `<config_dir>/solys2tracker/settings.json`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(FILE_NAME))
    }

    /// Store at the default location.
    pub fn open_default() -> Result<Self> {
        Self::default_path().map(Self::new).ok_or(Error::NoConfigDir)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the settings. Missing or unreadable files yield empty settings.
    #[must_use]
    pub fn load(&self) -> Settings {
        match self.try_load() {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Ignoring settings file {}: {e}", self.path.display());
                Settings::default()
            }
        }
    }

    fn try_load(&self) -> Result<Settings> {
        if !self.path.exists() {
            debug!("No settings file at {}", self.path.display());
            return Ok(Settings::default());
        }
        let text = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Writes the whole snapshot, creating parent directories.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, text)?;
        Ok(())
    }

    /// Updates a single key, keeping whatever else is on disk.
    pub fn save_value(&self, key: SettingKey, value: Value) -> Result<()> {
        let mut settings = self.load();
        settings.set(key, value);
        self.save(&settings)
    }

    /// Parses and stores user text for `key`.
    pub fn save_text(&self, key: SettingKey, text: &str) -> Result<()> {
        self.save_value(key, key.parse_value(text)?)
    }

    /// Persists the parameters of a successful connection.
    pub fn remember_connection(&self, params: &ConnectionParams) -> Result<()> {
        let mut settings = self.load();
        settings.remember_connection(params);
        self.save(&settings)
    }
}
