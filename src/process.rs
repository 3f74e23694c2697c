//! Subprocess primitives shared by both backends

use log::debug;
use std::io;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::{Child, Command};

/// Keeps console programs from flashing a window on Windows
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Build a command with no console window and no inherited stdin
pub fn command(program: &str, args: &[String]) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args).stdin(Stdio::null());
    #[cfg(windows)]
    cmd.creation_flags(CREATE_NO_WINDOW);
    cmd
}

/// Run `cmd` to completion capturing stdout/stderr, waiting at most `timeout`.
///
/// The child is killed if the wait expires; that case is reported as
/// `io::ErrorKind::TimedOut`.
pub async fn output_with_timeout(mut cmd: Command, timeout: Duration) -> io::Result<Output> {
    cmd.stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(result) => result,
        Err(_) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("timed out after {}s", timeout.as_secs_f32()),
        )),
    }
}

/// Start `program` without waiting for it to finish
pub fn spawn_detached(program: &str, args: &[String]) -> io::Result<Child> {
    debug!("Spawning {} {:?}", program, args);
    command(program, args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
}

/// Render a program and its arguments the way a user would type them
pub fn display_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}
