//! Error types for the Jarvis library

use thiserror::Error;

/// Result type alias for Jarvis operations
pub type Result<T> = std::result::Result<T, JarvisError>;

/// Error types for Jarvis operations.
///
/// The `Display` text of every variant is the message shown to the user.
#[derive(Error, Debug)]
pub enum JarvisError {
    /// The adb binary could not be located
    #[error("Error: ADB executable not found. Please ensure it's installed and in your PATH.")]
    AdbNotFound,

    /// adb ran but exited with a non-zero status
    #[error("ADB Command Error: '{command}' failed with: {message}")]
    AdbCommandFailed { command: String, message: String },

    /// Any other subprocess failure, including timeouts
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),

    /// Directory missing or not a directory
    #[error("Error: Directory '{0}' not found or is not a directory.")]
    DirectoryNotFound(String),

    /// Directory exists but could not be read
    #[error("Error listing directory '{path}': {source}")]
    DirectoryRead {
        path: String,
        source: std::io::Error,
    },

    /// Application launch request could not be dispatched
    #[error("Error opening application '{name}': {source}")]
    LaunchFailed {
        name: String,
        source: std::io::Error,
    },

    #[error("Unknown system command: {0}")]
    UnknownSystemCommand(String),

    #[error("System command '{0}' requires confirmation.")]
    ConfirmationRequired(String),

    #[error("Error executing system command '{key}': {source}")]
    SystemCommandFailed {
        key: String,
        source: std::io::Error,
    },

    /// Monkey could not launch a package that is installed
    #[error("App '{package}' found, but could not be launched via monkey. Output: {output}")]
    AppNotLaunchable { package: String, output: String },

    /// Monkey could not launch a package and the package list does not show it
    #[error("Failed to open app '{package}'. It might not be installed or launchable. ADB Output: {output}")]
    AppNotFound { package: String, output: String },

    #[error("Error sending intent '{action}'. Output: {output}")]
    IntentFailed { action: String, output: String },

    /// `screencap` on the device failed
    #[error("Failed to take screenshot on device: {0}")]
    DeviceCaptureFailed(String),

    /// `adb pull` of the captured screenshot failed
    #[error("Failed to pull screenshot from device ({remote}) to {local}: {message}")]
    ScreenshotPullFailed {
        remote: String,
        local: String,
        message: String,
    },

    #[error("Screenshot capture is not supported on this platform.")]
    CaptureUnsupported,

    /// Screen capture failed
    #[error("Screenshot capture failed: {0}")]
    CaptureError(String),

    /// A backend could not be constructed
    #[error("{0} not available/loaded.")]
    BackendUnavailable(&'static str),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Windows API error
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    WindowsError(#[from] windows::core::Error),

    /// Image error
    #[cfg(windows)]
    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),
}
