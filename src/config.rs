//! Runtime configuration

use crate::error::{JarvisError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default adb binary, resolved through the search path
pub const DEFAULT_ADB_PATH: &str = "adb";

/// Default remote path used while capturing Android screenshots
pub const DEFAULT_DEVICE_TMP_PATH: &str = "/sdcard/screenshot.png";

/// Configuration shared by the dispatcher and both backends.
///
/// Every field is optional in the JSON file; missing fields take the defaults
/// below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// adb executable name or path
    pub adb_path: String,
    /// Upper bound for any captured subprocess call
    pub command_timeout_secs: u64,
    /// Program and leading arguments used to launch desktop applications.
    /// The application name is appended as the final argument.
    pub launch_command: Vec<String>,
    /// Run shutdown/restart for real instead of describing them
    pub execute_system_commands: bool,
    /// Directory that relative screenshot filenames are placed in
    pub screenshot_dir: PathBuf,
    /// Scratch path on the device for `screencap`
    pub device_tmp_path: String,
    /// Serial passed as `-s` when a command does not name one
    pub default_device: Option<String>,
    /// Maximum number of console log entries kept in memory
    pub log_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            adb_path: DEFAULT_ADB_PATH.to_string(),
            command_timeout_secs: 30,
            launch_command: vec![
                "cmd".to_string(),
                "/C".to_string(),
                "start".to_string(),
                String::new(),
            ],
            execute_system_commands: false,
            screenshot_dir: PathBuf::from("."),
            device_tmp_path: DEFAULT_DEVICE_TMP_PATH.to_string(),
            default_device: None,
            log_capacity: 1000,
        }
    }
}

impl Config {
    /// Load configuration from an optional JSON file, then apply environment
    /// overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_json(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Apply `JARVIS_*` overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("JARVIS_ADB_PATH") {
            self.adb_path = path;
        }
        if let Some(device) = lookup("JARVIS_DEVICE") {
            self.default_device = Some(device).filter(|d| !d.is_empty());
        }
        if let Some(secs) = lookup("JARVIS_TIMEOUT_SECS") {
            self.command_timeout_secs = secs.trim().parse().map_err(|_| {
                JarvisError::Config(format!("JARVIS_TIMEOUT_SECS is not a number: {}", secs))
            })?;
        }
        Ok(())
    }

    /// Reject values no backend can work with
    pub fn validate(&self) -> Result<()> {
        if self.adb_path.trim().is_empty() {
            return Err(JarvisError::Config("adb_path must not be empty".into()));
        }
        if self.command_timeout_secs == 0 {
            return Err(JarvisError::Config(
                "command_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.log_capacity == 0 {
            return Err(JarvisError::Config(
                "log_capacity must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}
