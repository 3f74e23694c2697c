//! Command dispatcher - routes parsed console lines to lazily constructed
//! backends and records everything in the console log

use crate::adb::{AdbShell, AdbTransport};
use crate::android::AndroidAutomator;
use crate::command::{self, AdbAction, Command, HELP};
use crate::config::Config;
use crate::desktop::DesktopAutomator;
use crate::error::{JarvisError, Result};
use crate::log_buffer::ConsoleLog;
use crate::types::{CommandResult, TargetOs};
use log::info;
use std::path::PathBuf;

const DESKTOP_BACKEND: &str = "WindowsAutomator";
const ANDROID_BACKEND: &str = "AndroidAutomator";

const WIN: &str = "Jarvis (Win)";
const DROID: &str = "Jarvis (Droid)";

/// Builds backends on first use
#[allow(async_fn_in_trait)]
pub trait BackendFactory {
    type Adb: AdbTransport;

    fn desktop(&self) -> Result<DesktopAutomator>;

    async fn android(&self) -> Result<AndroidAutomator<Self::Adb>>;
}

/// Production factory: the OS shell and the adb binary from config
#[derive(Debug, Clone)]
pub struct SystemBackends {
    config: Config,
}

impl SystemBackends {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl BackendFactory for SystemBackends {
    type Adb = AdbShell;

    fn desktop(&self) -> Result<DesktopAutomator> {
        DesktopAutomator::new(&self.config)
    }

    async fn android(&self) -> Result<AndroidAutomator<AdbShell>> {
        let shell = AdbShell::new(self.config.adb_path.clone(), self.config.command_timeout())?;
        Ok(AndroidAutomator::new(shell).await)
    }
}

/// Routes console lines to backends.
///
/// Each backend slot is empty until a command needs it; a failed
/// construction leaves it empty so the next command retries.
pub struct Dispatcher<F: BackendFactory> {
    factory: F,
    screenshot_dir: PathBuf,
    device_tmp_path: String,
    default_device: Option<String>,
    desktop: Option<DesktopAutomator>,
    android: Option<AndroidAutomator<F::Adb>>,
}

impl Dispatcher<SystemBackends> {
    /// Dispatcher over the real shell and adb
    pub fn from_config(config: &Config) -> Self {
        Self::new(SystemBackends::new(config.clone()), config)
    }
}

impl<F: BackendFactory> Dispatcher<F> {
    pub fn new(factory: F, config: &Config) -> Self {
        Self {
            factory,
            screenshot_dir: config.screenshot_dir.clone(),
            device_tmp_path: config.device_tmp_path.clone(),
            default_device: config.default_device.clone(),
            desktop: None,
            android: None,
        }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn desktop_loaded(&self) -> bool {
        self.desktop.is_some()
    }

    pub fn android_loaded(&self) -> bool {
        self.android.is_some()
    }

    /// Handle one console line.
    ///
    /// Never fails: every problem becomes an unsuccessful result whose
    /// message is also appended to `log`.
    pub async fn handle(&mut self, line: &str, log: &mut ConsoleLog) -> CommandResult {
        let line = line.trim();
        let parsed = match command::parse(line) {
            Ok(Command::Empty) => return CommandResult::ok(""),
            other => other,
        };

        log.push(format!("User command: {}", line));
        let result = match parsed {
            Ok(cmd) => self.execute(cmd, log).await,
            Err(e) => CommandResult::failed(e.to_string()),
        };

        log.push(result.message.clone());
        for item in &result.details {
            log.push(format!("  - {}", item));
        }
        result
    }

    async fn execute(&mut self, cmd: Command, log: &mut ConsoleLog) -> CommandResult {
        match cmd {
            Command::Empty => CommandResult::ok(""),
            Command::Hello => CommandResult::ok("Jarvis: Hello there!"),
            Command::Help => CommandResult::ok("Jarvis: Available commands:")
                .with_details(HELP.iter().map(|s| s.to_string()).collect()),
            Command::Open { target, os } => self.open(&target, os, log).await,
            Command::List { path } => match self.desktop(log) {
                Ok(desktop) => match desktop.list_directory_contents(Some(path.as_str())).await {
                    Ok(entries) => CommandResult::ok(format!("{}: Contents of '{}':", WIN, path))
                        .with_details(entries),
                    Err(e) => outcome(WIN, Err(e)),
                },
                Err(e) => unavailable(e),
            },
            Command::System { key, confirmed } => match self.desktop(log) {
                Ok(desktop) => outcome(WIN, desktop.system_command(&key, !confirmed)),
                Err(e) => unavailable(e),
            },
            Command::Screenshot { os, filename } => self.screenshot(os, &filename, log).await,
            Command::Adb { device, action } => {
                let device = device.or_else(|| self.default_device.clone());
                self.adb(action, device.as_deref(), log).await
            }
        }
    }

    async fn open(&mut self, target: &str, os: TargetOs, log: &mut ConsoleLog) -> CommandResult {
        match os {
            TargetOs::Windows => match self.desktop(log) {
                Ok(desktop) => outcome(WIN, desktop.open_application(target)),
                Err(e) => unavailable(e),
            },
            TargetOs::Android => {
                let device = self.default_device.clone();
                match self.android(log).await {
                    Ok(android) => outcome(DROID, android.open_app(target, device.as_deref()).await),
                    Err(e) => unavailable(e),
                }
            }
        }
    }

    async fn screenshot(&mut self, os: TargetOs, filename: &str, log: &mut ConsoleLog) -> CommandResult {
        let path = self.screenshot_dir.join(filename);
        match os {
            TargetOs::Windows => match self.desktop(log) {
                Ok(desktop) => outcome(WIN, desktop.take_screenshot(&path)),
                Err(e) => unavailable(e),
            },
            TargetOs::Android => {
                let tmp = self.device_tmp_path.clone();
                let device = self.default_device.clone();
                match self.android(log).await {
                    Ok(android) => outcome(
                        DROID,
                        android
                            .take_screenshot_android(&path, &tmp, device.as_deref())
                            .await,
                    ),
                    Err(e) => unavailable(e),
                }
            }
        }
    }

    async fn adb(&mut self, action: AdbAction, device: Option<&str>, log: &mut ConsoleLog) -> CommandResult {
        let android = match self.android(log).await {
            Ok(android) => android,
            Err(e) => return unavailable(e),
        };

        match action {
            AdbAction::Devices => match android.list_connected_devices().await {
                Ok(devices) if devices.is_empty() => {
                    CommandResult::ok(format!("{}: No devices found connected via ADB.", DROID))
                }
                Ok(devices) => {
                    CommandResult::ok(format!("{} Connected Devices/Emulators:", DROID))
                        .with_details(devices)
                }
                Err(e) => CommandResult::failed(format!("{} Error listing devices: {}", DROID, e)),
            },
            AdbAction::Tap { x, y } => outcome(
                &format!("{} Tap at ({},{})", DROID, x, y),
                android.simulate_input_tap(x, y, device).await,
            ),
            AdbAction::Swipe {
                from,
                to,
                duration_ms,
            } => outcome(
                &format!(
                    "{} Swipe from ({},{}) to ({},{}) duration {}ms",
                    DROID, from.0, from.1, to.0, to.1, duration_ms
                ),
                android.simulate_input_swipe(from, to, duration_ms, device).await,
            ),
            AdbAction::Text(text) => outcome(
                &format!("{} Text input '{}'", DROID, text),
                android.simulate_input_text(&text, device).await,
            ),
            AdbAction::Intent { action, data_uri } => outcome(
                DROID,
                android
                    .send_intent(&action, data_uri.as_deref(), None, None, device)
                    .await,
            ),
        }
    }

    /// The desktop backend, constructing it on first use
    fn desktop(&mut self, log: &mut ConsoleLog) -> Result<&DesktopAutomator> {
        if self.desktop.is_none() {
            match self.factory.desktop() {
                Ok(desktop) => {
                    info!("{} constructed", DESKTOP_BACKEND);
                    log.push(format!("Jarvis: {} loaded.", DESKTOP_BACKEND));
                    self.desktop = Some(desktop);
                }
                Err(e) => {
                    log.push(format!(
                        "Jarvis Error: Failed to initialize {}: {}",
                        DESKTOP_BACKEND, e
                    ));
                    return Err(JarvisError::BackendUnavailable(DESKTOP_BACKEND));
                }
            }
        }
        self.desktop
            .as_ref()
            .ok_or(JarvisError::BackendUnavailable(DESKTOP_BACKEND))
    }

    /// The Android backend, constructing it (and running its availability
    /// check) on first use
    async fn android(&mut self, log: &mut ConsoleLog) -> Result<&AndroidAutomator<F::Adb>> {
        if self.android.is_none() {
            match self.factory.android().await {
                Ok(android) => {
                    info!("{} constructed", ANDROID_BACKEND);
                    log.push(format!(
                        "Jarvis: {} loaded. Initializing ADB connection...",
                        ANDROID_BACKEND
                    ));
                    log.push(format!("{}: {}", DROID, android.availability()));
                    self.android = Some(android);
                }
                Err(e) => {
                    log.push(format!(
                        "Jarvis Error: Failed to initialize {}: {}",
                        ANDROID_BACKEND, e
                    ));
                    return Err(JarvisError::BackendUnavailable(ANDROID_BACKEND));
                }
            }
        }
        self.android
            .as_ref()
            .ok_or(JarvisError::BackendUnavailable(ANDROID_BACKEND))
    }
}

/// `<label>: <message>` with the operation's success flag
fn outcome(label: &str, result: Result<String>) -> CommandResult {
    match result {
        Ok(message) => CommandResult::ok(format!("{}: {}", label, message)),
        Err(e) => CommandResult::failed(format!("{}: {}", label, e)),
    }
}

fn unavailable(e: JarvisError) -> CommandResult {
    CommandResult::failed(format!("Jarvis: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedAdb;
    use std::cell::Cell;

    /// Factory over a scripted adb that counts constructions
    struct FakeBackends {
        config: Config,
        adb: ScriptedAdb,
        desktop_builds: Cell<usize>,
        android_builds: Cell<usize>,
        android_failures_left: Cell<usize>,
    }

    impl FakeBackends {
        fn new(config: Config) -> Self {
            Self {
                config,
                adb: ScriptedAdb::new(),
                desktop_builds: Cell::new(0),
                android_builds: Cell::new(0),
                android_failures_left: Cell::new(0),
            }
        }
    }

    impl BackendFactory for FakeBackends {
        type Adb = ScriptedAdb;

        fn desktop(&self) -> Result<DesktopAutomator> {
            self.desktop_builds.set(self.desktop_builds.get() + 1);
            DesktopAutomator::new(&self.config)
        }

        async fn android(&self) -> Result<AndroidAutomator<ScriptedAdb>> {
            self.android_builds.set(self.android_builds.get() + 1);
            let failures = self.android_failures_left.get();
            if failures > 0 {
                self.android_failures_left.set(failures - 1);
                return Err(JarvisError::AdbNotFound);
            }
            Ok(AndroidAutomator::new(self.adb.clone()).await)
        }
    }

    fn test_config() -> Config {
        Config {
            launch_command: vec!["jarvis-no-such-launcher-5e1d".into()],
            ..Config::default()
        }
    }

    fn dispatcher(config: Config) -> (Dispatcher<FakeBackends>, ScriptedAdb) {
        let factory = FakeBackends::new(config.clone());
        let adb = factory.adb.clone();
        (Dispatcher::new(factory, &config), adb)
    }

    fn messages(log: &ConsoleLog) -> Vec<String> {
        log.entries().map(|e| e.message.clone()).collect()
    }

    #[tokio::test]
    async fn test_hello() {
        let (mut d, _) = dispatcher(test_config());
        let mut log = ConsoleLog::new(100);
        let result = d.handle("hello", &mut log).await;
        assert!(result.success);
        assert_eq!(
            messages(&log),
            vec!["User command: hello", "Jarvis: Hello there!"]
        );
    }

    #[tokio::test]
    async fn test_blank_line_logs_nothing() {
        let (mut d, _) = dispatcher(test_config());
        let mut log = ConsoleLog::new(100);
        d.handle("   ", &mut log).await;
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_unrecognized_constructs_nothing() {
        let (mut d, adb) = dispatcher(test_config());
        let mut log = ConsoleLog::new(100);
        for line in ["dance", "open", "adb", "list", "system", "adb reboot now"] {
            let result = d.handle(line, &mut log).await;
            assert!(!result.success, "{line}");
        }
        assert!(messages(&log)[1].contains("not recognized"));
        assert!(!d.desktop_loaded());
        assert!(!d.android_loaded());
        assert_eq!(d.factory().desktop_builds.get(), 0);
        assert_eq!(d.factory().android_builds.get(), 0);
        assert_eq!(adb.call_count(), 0);
    }

    #[tokio::test]
    async fn test_open_on_android_routes_to_android_only() {
        let (mut d, adb) = dispatcher(test_config());
        let mut log = ConsoleLog::new(100);
        let result = d.handle("open com.android.chrome on android", &mut log).await;

        assert!(result.success, "{}", result.message);
        assert_eq!(
            result.message,
            "Jarvis (Droid): Attempting to open app 'com.android.chrome'."
        );
        assert!(d.android_loaded());
        assert!(!d.desktop_loaded());
        // version + devices from the availability check, then monkey
        let calls = adb.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[2].joined().starts_with("shell monkey -p com.android.chrome"));
        assert!(messages(&log)
            .iter()
            .any(|m| m == "Jarvis: AndroidAutomator loaded. Initializing ADB connection..."));
    }

    #[tokio::test]
    async fn test_open_routes_to_windows_by_default() {
        for line in ["open notepad", "open notepad on windows", "open android studio"] {
            let (mut d, adb) = dispatcher(test_config());
            let mut log = ConsoleLog::new(100);
            let result = d.handle(line, &mut log).await;

            // the configured launcher does not exist, so the launch itself fails
            assert!(!result.success);
            assert!(result.message.starts_with("Jarvis (Win): Error opening application"));
            assert!(d.desktop_loaded(), "{line}");
            assert!(!d.android_loaded(), "{line}");
            assert_eq!(adb.call_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_invalid_tap_never_reaches_adb() {
        let (mut d, adb) = dispatcher(test_config());
        let mut log = ConsoleLog::new(100);
        let result = d.handle("adb tap left top", &mut log).await;
        assert!(!result.success);
        assert!(result.message.contains("Invalid coordinates for tap"));
        assert_eq!(adb.call_count(), 0);
        assert!(!d.android_loaded());
    }

    #[tokio::test]
    async fn test_tap_uses_default_device_unless_overridden() {
        let config = Config {
            default_device: Some("emulator-5554".into()),
            ..test_config()
        };
        let (mut d, adb) = dispatcher(config);
        let mut log = ConsoleLog::new(100);

        let result = d.handle("adb tap 100 200", &mut log).await;
        assert!(result.success);
        assert_eq!(result.message, "Jarvis (Droid) Tap at (100,200): ");
        d.handle("adb -s R58M tap 1 2", &mut log).await;

        let calls = adb.calls();
        assert_eq!(calls[2].joined(), "shell input tap 100 200");
        assert_eq!(calls[2].device.as_deref(), Some("emulator-5554"));
        assert_eq!(calls[3].device.as_deref(), Some("R58M"));
    }

    #[tokio::test]
    async fn test_android_backend_built_once() {
        let (mut d, _) = dispatcher(test_config());
        let mut log = ConsoleLog::new(100);
        d.handle("adb text hi", &mut log).await;
        d.handle("adb swipe 1 2 3 4", &mut log).await;
        d.handle("screenshot android", &mut log).await;
        assert_eq!(d.factory().android_builds.get(), 1);
    }

    #[tokio::test]
    async fn test_failed_construction_is_retried() {
        let (mut d, _) = dispatcher(test_config());
        d.factory().android_failures_left.set(1);
        let mut log = ConsoleLog::new(100);

        let result = d.handle("adb devices", &mut log).await;
        assert!(!result.success);
        assert_eq!(result.message, "Jarvis: AndroidAutomator not available/loaded.");
        assert!(messages(&log)
            .iter()
            .any(|m| m.starts_with("Jarvis Error: Failed to initialize AndroidAutomator")));
        assert!(!d.android_loaded());

        let result = d.handle("adb devices", &mut log).await;
        assert!(result.success);
        assert!(d.android_loaded());
        assert_eq!(d.factory().android_builds.get(), 2);
    }

    #[tokio::test]
    async fn test_desktop_construction_failure() {
        let config = Config {
            launch_command: Vec::new(),
            ..Config::default()
        };
        let (mut d, _) = dispatcher(config);
        let mut log = ConsoleLog::new(100);
        let result = d.handle("system shutdown", &mut log).await;
        assert!(!result.success);
        assert_eq!(result.message, "Jarvis: WindowsAutomator not available/loaded.");
        assert!(!d.desktop_loaded());
    }

    #[tokio::test]
    async fn test_adb_devices_details() {
        let (mut d, adb) = dispatcher(test_config());
        adb.respond("v")
            .respond("List of devices attached\nemulator-5554\tdevice")
            .respond("List of devices attached\nemulator-5554\tdevice\nR58M\tdevice");
        let mut log = ConsoleLog::new(100);

        let result = d.handle("adb devices", &mut log).await;
        assert!(result.success);
        assert_eq!(result.details, vec!["emulator-5554", "R58M"]);
        assert!(messages(&log).contains(&"  - R58M".to_string()));
    }

    #[tokio::test]
    async fn test_system_command_simulated() {
        let (mut d, _) = dispatcher(test_config());
        let mut log = ConsoleLog::new(100);
        let result = d.handle("system shutdown", &mut log).await;
        assert!(result.success);
        assert!(result.message.starts_with("Jarvis (Win): Simulating"));
        assert!(result.message.contains("shutdown"));

        let result = d.handle("system hibernate", &mut log).await;
        assert!(!result.success);
        assert_eq!(result.message, "Jarvis (Win): Unknown system command: hibernate");
        assert_eq!(d.factory().desktop_builds.get(), 1);
    }

    #[tokio::test]
    async fn test_list_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Report.TXT"), "x").unwrap();
        let (mut d, _) = dispatcher(test_config());
        let mut log = ConsoleLog::new(100);

        let line = format!("list {}", dir.path().display());
        let result = d.handle(&line, &mut log).await;
        assert!(result.success, "{}", result.message);
        assert_eq!(result.details, vec!["Report.TXT"]);

        let result = d
            .handle(&format!("list {}", dir.path().join("missing").display()), &mut log)
            .await;
        assert!(!result.success);
        assert!(result.message.contains("not found"));
    }

    #[tokio::test]
    async fn test_android_screenshot_pull_failure() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            screenshot_dir: dir.path().to_path_buf(),
            ..test_config()
        };
        let (mut d, adb) = dispatcher(config);
        adb.respond("v")
            .respond("List of devices attached\nemulator-5554\tdevice")
            .respond("")
            .fail("adb pull", "remote object does not exist");
        let mut log = ConsoleLog::new(100);

        let result = d.handle("screenshot android Home", &mut log).await;
        assert!(!result.success);
        assert!(result.message.contains("Failed to pull screenshot"));
        let pull = adb.calls()[3].joined();
        assert!(pull.starts_with("pull /sdcard/screenshot.png "));
        assert!(pull.ends_with("Home.png"));
    }

    #[cfg(not(windows))]
    #[tokio::test]
    async fn test_windows_screenshot_unsupported_here() {
        let (mut d, _) = dispatcher(test_config());
        let mut log = ConsoleLog::new(100);
        let result = d.handle("screenshot", &mut log).await;
        assert!(!result.success);
        assert!(result.message.contains("not supported"));
        assert!(d.desktop_loaded());
    }
}
