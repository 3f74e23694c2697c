//! Jarvis - a text-command console for desktop and Android automation
//!
//! Each console line is parsed into a [`Command`], routed to either the
//! desktop backend (OS shell) or the Android backend (the `adb` binary), and
//! the outcome is appended to a [`ConsoleLog`]. Backends are constructed the
//! first time a command needs them.
//!
//! # Example
//!
//! ```rust,no_run
//! use jarvis::{Config, ConsoleLog, Dispatcher};
//!
//! #[tokio::main]
//! async fn main() -> jarvis::Result<()> {
//!     let config = Config::load(None)?;
//!     let mut dispatcher = Dispatcher::from_config(&config);
//!     let mut log = ConsoleLog::new(config.log_capacity);
//!
//!     // Lists devices through `adb devices`
//!     let result = dispatcher.handle("adb devices", &mut log).await;
//!     println!("{}", result.message);
//!
//!     for entry in log.entries() {
//!         println!("{}", entry);
//!     }
//!     Ok(())
//! }
//! ```

pub mod adb;
pub mod android;
#[cfg(windows)]
pub mod capture;
pub mod command;
pub mod config;
pub mod desktop;
pub mod dispatcher;
pub mod error;
pub mod log_buffer;
pub mod process;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use adb::{AdbShell, AdbTransport};
pub use android::{AndroidAutomator, Availability};
pub use command::{AdbAction, Command, ParseError};
pub use config::Config;
pub use desktop::{DesktopAutomator, SystemCommandMode};
pub use dispatcher::{BackendFactory, Dispatcher, SystemBackends};
pub use error::{JarvisError, Result};
pub use log_buffer::{ConsoleLog, LogEntry};
pub use types::{CommandResult, TargetOs};
