//! Android automator - device operations built on the adb runner

use crate::adb::{active_devices, args, parse_device_list, AdbTransport};
use crate::error::{JarvisError, Result};
use log::{debug, info, warn};
use std::fmt;
use std::path::Path;

/// Marker monkey prints when the launch intent was delivered
const MONKEY_INJECTED: &str = "Events injected: 1";

/// Default swipe duration in milliseconds
pub const DEFAULT_SWIPE_MS: u32 = 300;

/// Result of the best-effort check performed at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    /// adb works and these devices are online
    Ready(Vec<String>),
    /// adb works but lists nothing
    NoDevices,
    /// Every listed device is offline
    AllOffline,
    /// adb is missing or broken
    AdbUnavailable(String),
}

impl Availability {
    pub fn is_ready(&self) -> bool {
        matches!(self, Availability::Ready(_))
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Availability::Ready(devices) => write!(
                f,
                "ADB initialized. Connected devices/emulators found: {}",
                devices.join(", ")
            ),
            Availability::NoDevices => {
                f.write_str("Warning: No Android devices or emulators found connected via ADB.")
            }
            Availability::AllOffline => f.write_str(
                "Warning: No active Android devices or emulators found. Some might be offline.",
            ),
            Availability::AdbUnavailable(reason) => write!(
                f,
                "Warning: ADB command not found or not working. Please ensure ADB is installed and in your PATH. ({})",
                reason
            ),
        }
    }
}

/// What a monkey launch attempt told us
#[derive(Debug, Clone, PartialEq, Eq)]
enum LaunchAttempt {
    Launched,
    /// Monkey ran but its output does not confirm a launch
    Ambiguous(String),
}

impl LaunchAttempt {
    fn from_output(output: String) -> Self {
        if output.is_empty() || output.contains(MONKEY_INJECTED) {
            LaunchAttempt::Launched
        } else {
            LaunchAttempt::Ambiguous(output)
        }
    }
}

/// Android automation over an [`AdbTransport`]
pub struct AndroidAutomator<T: AdbTransport> {
    transport: T,
    availability: Availability,
}

impl<T: AdbTransport> AndroidAutomator<T> {
    /// Create the automator and run the availability check.
    ///
    /// The check never fails construction; operations fail individually when
    /// adb or a device is missing.
    pub async fn new(transport: T) -> Self {
        let availability = check_availability(&transport).await;
        match &availability {
            Availability::Ready(_) => info!("{}", availability),
            _ => warn!("{}", availability),
        }
        Self {
            transport,
            availability,
        }
    }

    pub fn availability(&self) -> &Availability {
        &self.availability
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Serials of all listed devices, status column dropped
    pub async fn list_connected_devices(&self) -> Result<Vec<String>> {
        let output = self.transport.run(&args(["devices"]), None).await?;
        Ok(parse_device_list(&output))
    }

    /// Launch the main activity of `package`.
    ///
    /// A launch that monkey does not confirm is followed by a package-list
    /// probe so "installed but not launchable" and "not installed" get
    /// different errors.
    pub async fn open_app(&self, package: &str, device: Option<&str>) -> Result<String> {
        match self.attempt_launch(package, device).await? {
            LaunchAttempt::Launched => Ok(format!("Attempting to open app '{}'.", package)),
            LaunchAttempt::Ambiguous(output) => {
                Err(self.diagnose_launch_failure(package, output, device).await)
            }
        }
    }

    async fn attempt_launch(&self, package: &str, device: Option<&str>) -> Result<LaunchAttempt> {
        let output = self
            .transport
            .run(
                &args([
                    "shell",
                    "monkey",
                    "-p",
                    package,
                    "-c",
                    "android.intent.category.LAUNCHER",
                    "1",
                ]),
                device,
            )
            .await?;
        Ok(LaunchAttempt::from_output(output))
    }

    async fn diagnose_launch_failure(
        &self,
        package: &str,
        output: String,
        device: Option<&str>,
    ) -> JarvisError {
        let listed = self
            .transport
            .run(&args(["shell", "pm", "list", "packages", package]), device)
            .await;
        match listed {
            Ok(packages) if packages.contains(package) => JarvisError::AppNotLaunchable {
                package: package.to_string(),
                output,
            },
            _ => JarvisError::AppNotFound {
                package: package.to_string(),
                output,
            },
        }
    }

    /// Start an activity for an intent via `am start`
    pub async fn send_intent(
        &self,
        action: &str,
        data_uri: Option<&str>,
        package: Option<&str>,
        component: Option<&str>,
        device: Option<&str>,
    ) -> Result<String> {
        let mut cmd = args(["shell", "am", "start"]);
        if let Some(package) = package {
            cmd.extend(args(["-p", package]));
        }
        if let Some(component) = component {
            cmd.extend(args(["-n", component]));
        }
        cmd.extend(args(["-a", action]));
        if let Some(uri) = data_uri {
            cmd.extend(args(["-d", uri]));
        }

        let output = self.transport.run(&cmd, device).await?;
        if output.contains("Error") || output.contains("Exception") {
            return Err(JarvisError::IntentFailed {
                action: action.to_string(),
                output,
            });
        }
        Ok(format!("Intent '{}' sent. Output: {}", action, output))
    }

    pub async fn simulate_input_tap(&self, x: i32, y: i32, device: Option<&str>) -> Result<String> {
        let (x, y) = (x.to_string(), y.to_string());
        self.transport
            .run(&args(["shell", "input", "tap", x.as_str(), y.as_str()]), device)
            .await
    }

    pub async fn simulate_input_swipe(
        &self,
        (x1, y1): (i32, i32),
        (x2, y2): (i32, i32),
        duration_ms: u32,
        device: Option<&str>,
    ) -> Result<String> {
        self.transport
            .run(
                &args([
                    "shell".to_string(),
                    "input".to_string(),
                    "swipe".to_string(),
                    x1.to_string(),
                    y1.to_string(),
                    x2.to_string(),
                    y2.to_string(),
                    duration_ms.to_string(),
                ]),
                device,
            )
            .await
    }

    /// Type `text` into the focused field.
    ///
    /// Only single quotes are escaped; other shell metacharacters may be
    /// mangled by the device shell.
    pub async fn simulate_input_text(&self, text: &str, device: Option<&str>) -> Result<String> {
        let escaped = escape_single_quotes(text);
        self.transport
            .run(&args(["shell", "input", "text", escaped.as_str()]), device)
            .await
    }

    /// Capture the screen on the device, pull it to `local_path`, then remove
    /// the remote copy.
    ///
    /// Only the capture and pull steps decide the outcome; a failed cleanup is
    /// logged and otherwise ignored.
    pub async fn take_screenshot_android(
        &self,
        local_path: &Path,
        device_tmp_path: &str,
        device: Option<&str>,
    ) -> Result<String> {
        self.transport
            .run(&args(["shell", "screencap", device_tmp_path]), device)
            .await
            .map_err(|e| JarvisError::DeviceCaptureFailed(e.to_string()))?;

        if let Some(parent) = local_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let local = local_path.to_string_lossy().to_string();
        self.transport
            .run(&args(["pull", device_tmp_path, local.as_str()]), device)
            .await
            .map_err(|e| JarvisError::ScreenshotPullFailed {
                remote: device_tmp_path.to_string(),
                local: local.clone(),
                message: e.to_string(),
            })?;

        if let Err(e) = self
            .transport
            .run(&args(["shell", "rm", device_tmp_path]), device)
            .await
        {
            debug!("Ignoring failed cleanup of {}: {}", device_tmp_path, e);
        }

        Ok(format!("Screenshot saved to {}", local))
    }
}

async fn check_availability<T: AdbTransport>(transport: &T) -> Availability {
    if let Err(e) = transport.run(&args(["version"]), None).await {
        return Availability::AdbUnavailable(e.to_string());
    }
    let output = match transport.run(&args(["devices"]), None).await {
        Ok(output) => output,
        Err(e) => return Availability::AdbUnavailable(e.to_string()),
    };

    let online = active_devices(&output);
    if !online.is_empty() {
        Availability::Ready(online)
    } else if parse_device_list(&output).is_empty() {
        Availability::NoDevices
    } else {
        Availability::AllOffline
    }
}

/// Escape single quotes for the device shell: `'` becomes `'\''`
pub fn escape_single_quotes(text: &str) -> String {
    text.replace('\'', "'\\''")
}
