//! ADB command runner
//!
//! Every Android operation funnels through [`AdbTransport::run`]. The
//! production transport, [`AdbShell`], shells out to the `adb` binary.

use crate::error::{JarvisError, Result};
use crate::process;
use log::debug;
use std::io;
use std::time::Duration;

/// Executes one adb invocation.
///
/// `args` are the arguments after the binary (and after `-s <device>`).
/// Returns trimmed stdout on success.
#[allow(async_fn_in_trait)]
pub trait AdbTransport {
    async fn run(&self, args: &[String], device: Option<&str>) -> Result<String>;
}

/// Transport that runs the adb binary as a subprocess
#[derive(Debug, Clone)]
pub struct AdbShell {
    adb_path: String,
    timeout: Duration,
}

impl AdbShell {
    pub fn new(adb_path: impl Into<String>, timeout: Duration) -> Result<Self> {
        let adb_path = adb_path.into();
        if adb_path.trim().is_empty() {
            return Err(JarvisError::Config("adb_path must not be empty".into()));
        }
        Ok(Self { adb_path, timeout })
    }

    pub fn adb_path(&self) -> &str {
        &self.adb_path
    }

    /// Full argument list including the optional device selector
    fn full_args(args: &[String], device: Option<&str>) -> Vec<String> {
        let mut full = Vec::with_capacity(args.len() + 2);
        if let Some(device) = device {
            full.push("-s".to_string());
            full.push(device.to_string());
        }
        full.extend(args.iter().cloned());
        full
    }
}

impl AdbTransport for AdbShell {
    async fn run(&self, args: &[String], device: Option<&str>) -> Result<String> {
        let full_args = Self::full_args(args, device);
        let display = process::display_command(&self.adb_path, &full_args);
        debug!("Executing ADB command: {}", display);

        let cmd = process::command(&self.adb_path, &full_args);
        classify_output(&display, process::output_with_timeout(cmd, self.timeout).await)
    }
}

/// Sort a finished (or failed-to-start) adb process into one of three
/// buckets: binary missing, non-zero exit, or anything else.
pub fn classify_output(display: &str, result: io::Result<std::process::Output>) -> Result<String> {
    let output = match result {
        Ok(output) => output,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(JarvisError::AdbNotFound),
        Err(e) => {
            return Err(JarvisError::Unexpected(format!("'{}': {}", display, e)));
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if output.status.success() {
        return Ok(stdout);
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    Err(JarvisError::AdbCommandFailed {
        command: display.to_string(),
        message: if stderr.is_empty() { stdout } else { stderr },
    })
}

/// Device serials from `adb devices` output.
///
/// The header line is skipped and only the first column is kept.
pub fn parse_device_list(output: &str) -> Vec<String> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// Serials of listed devices that are not `offline`
pub fn active_devices(output: &str) -> Vec<String> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some(_), Some("offline")) | (None, _) => None,
                (Some(serial), _) => Some(serial.to_string()),
            }
        })
        .collect()
}

/// Convert string literals into an owned argument vector
pub fn args<I, S>(parts: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    parts.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEVICES_OUTPUT: &str = "List of devices attached\n\
        emulator-5554\tdevice\n\
        \n\
        R58M12ABCDE\toffline\n\
        192.168.1.20:5555\tunauthorized\n";

    #[test]
    fn test_parse_device_list_drops_header_and_status() {
        assert_eq!(
            parse_device_list(DEVICES_OUTPUT),
            vec!["emulator-5554", "R58M12ABCDE", "192.168.1.20:5555"]
        );
    }

    #[test]
    fn test_parse_device_list_empty() {
        assert!(parse_device_list("List of devices attached").is_empty());
        assert!(parse_device_list("").is_empty());
    }

    #[test]
    fn test_active_devices_skips_offline() {
        assert_eq!(
            active_devices(DEVICES_OUTPUT),
            vec!["emulator-5554", "192.168.1.20:5555"]
        );
        assert!(active_devices("List of devices attached\nabc\toffline\n").is_empty());
    }

    #[test]
    fn test_full_args_device_selector() {
        let base = args(["shell", "input", "tap", "1", "2"]);
        assert_eq!(AdbShell::full_args(&base, None), base);
        assert_eq!(
            AdbShell::full_args(&base, Some("emulator-5554"))[..3],
            args(["-s", "emulator-5554", "shell"])[..]
        );
    }

    #[test]
    fn test_empty_adb_path_rejected() {
        assert!(AdbShell::new("", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_classify_not_found() {
        let err = classify_output("adb devices", Err(io::ErrorKind::NotFound.into())).unwrap_err();
        assert!(matches!(err, JarvisError::AdbNotFound));
        assert!(err.to_string().contains("ADB executable not found"));
    }

    #[test]
    fn test_classify_timeout_is_unexpected() {
        let err = classify_output(
            "adb pull /sdcard/x.png x.png",
            Err(io::Error::new(io::ErrorKind::TimedOut, "timed out after 30s")),
        )
        .unwrap_err();
        assert!(matches!(err, JarvisError::Unexpected(_)));
        assert!(err.to_string().starts_with("An unexpected error occurred"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_prefers_stderr() {
        // `sh` stands in for adb: its arguments are the script.
        let shell = AdbShell::new("sh", Duration::from_secs(5)).unwrap();
        let err = shell
            .run(&args(["-c", "echo partial; echo 'no devices' >&2; exit 1"]), None)
            .await
            .unwrap_err();
        match err {
            JarvisError::AdbCommandFailed { command, message } => {
                assert!(command.starts_with("sh -c"));
                assert_eq!(message, "no devices");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_falls_back_to_stdout() {
        let shell = AdbShell::new("sh", Duration::from_secs(5)).unwrap();
        let err = shell
            .run(&args(["-c", "echo only-stdout; exit 2"]), None)
            .await
            .unwrap_err();
        assert!(err.to_string().ends_with("failed with: only-stdout"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_success_returns_trimmed_stdout() {
        let shell = AdbShell::new("sh", Duration::from_secs(5)).unwrap();
        let out = shell.run(&args(["-c", "printf '  hi  \\n'"]), None).await.unwrap();
        assert_eq!(out, "hi");
    }
}
