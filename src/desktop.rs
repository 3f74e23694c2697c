//! Desktop (Windows) automator - shell launches, directory listing,
//! power commands and screen capture

use crate::config::Config;
use crate::error::{JarvisError, Result};
use crate::process;
use log::{info, warn};
use std::path::Path;

/// Keys accepted by [`DesktopAutomator::system_command`] and the command each
/// maps to
const SYSTEM_COMMANDS: &[(&str, &str)] = &[
    ("shutdown", "shutdown /s /t 1"),
    ("restart", "shutdown /r /t 1"),
];

/// Whether power commands are run or only described
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemCommandMode {
    Simulate,
    Execute,
}

/// Local desktop automation
#[derive(Debug, Clone)]
pub struct DesktopAutomator {
    launch_command: Vec<String>,
    system_mode: SystemCommandMode,
}

impl DesktopAutomator {
    /// Create an automator from config.
    ///
    /// Fails if no launch program is configured.
    pub fn new(config: &Config) -> Result<Self> {
        let mode = if config.execute_system_commands {
            SystemCommandMode::Execute
        } else {
            SystemCommandMode::Simulate
        };
        Self::with_launcher(config.launch_command.clone(), mode)
    }

    pub fn with_launcher(launch_command: Vec<String>, system_mode: SystemCommandMode) -> Result<Self> {
        match launch_command.first() {
            Some(program) if !program.trim().is_empty() => Ok(Self {
                launch_command,
                system_mode,
            }),
            _ => Err(JarvisError::Config("launch_command must name a program".into())),
        }
    }

    pub fn system_mode(&self) -> SystemCommandMode {
        self.system_mode
    }

    /// Ask the shell to launch `name` without waiting for it.
    ///
    /// Success only means the launch request was dispatched; the application
    /// itself may still fail to start.
    pub fn open_application(&self, name: &str) -> Result<String> {
        let (program, prefix) = self
            .launch_command
            .split_first()
            .ok_or_else(|| JarvisError::Config("launch_command must name a program".into()))?;
        let mut args = prefix.to_vec();
        args.push(name.to_string());

        process::spawn_detached(program, &args).map_err(|source| JarvisError::LaunchFailed {
            name: name.to_string(),
            source,
        })?;
        Ok(format!("Attempting to open '{}'.", name))
    }

    /// Entry names of `path` (default `.`) in filesystem order
    pub async fn list_directory_contents(&self, path: Option<&str>) -> Result<Vec<String>> {
        let path = path.filter(|p| !p.is_empty()).unwrap_or(".");
        let is_dir = tokio::fs::metadata(path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(JarvisError::DirectoryNotFound(path.to_string()));
        }

        let read_error = |source: std::io::Error| JarvisError::DirectoryRead {
            path: path.to_string(),
            source,
        };
        let mut dir = tokio::fs::read_dir(path).await.map_err(read_error)?;
        let mut names = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(read_error)? {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        Ok(names)
    }

    /// Shut down or restart the machine.
    ///
    /// In simulate mode nothing runs and the message describes the command.
    /// In execute mode a call with `confirmation_required` set is refused.
    pub fn system_command(&self, key: &str, confirmation_required: bool) -> Result<String> {
        let command = SYSTEM_COMMANDS
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, cmd)| *cmd)
            .ok_or_else(|| JarvisError::UnknownSystemCommand(key.to_string()))?;

        match self.system_mode {
            SystemCommandMode::Simulate => Ok(format!(
                "Simulating execution of system command: '{}'. Actual command: '{}'",
                key, command
            )),
            SystemCommandMode::Execute if confirmation_required => {
                Err(JarvisError::ConfirmationRequired(key.to_string()))
            }
            SystemCommandMode::Execute => {
                warn!("Executing system command '{}': {}", key, command);
                let mut parts = command.split_whitespace();
                let program = parts.next().unwrap_or_default();
                let args: Vec<String> = parts.map(str::to_string).collect();
                process::spawn_detached(program, &args).map_err(|source| {
                    JarvisError::SystemCommandFailed {
                        key: key.to_string(),
                        source,
                    }
                })?;
                Ok(format!("Executing system command: '{}' ({})", key, command))
            }
        }
    }

    /// Capture the primary display to `path`
    pub fn take_screenshot(&self, path: &Path) -> Result<String> {
        capture_to_file(path)?;
        info!("Desktop screenshot written to {}", path.display());
        Ok(format!("Screenshot saved to {}", path.display()))
    }
}

#[cfg(windows)]
fn capture_to_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    crate::capture::capture_screen()?.save(path)
}

#[cfg(not(windows))]
fn capture_to_file(_path: &Path) -> Result<()> {
    Err(JarvisError::CaptureUnsupported)
}
