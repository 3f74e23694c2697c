//! Console command language
//!
//! One line of text becomes one [`Command`]. Keywords are matched
//! case-insensitively; names, paths and typed text keep their case.

use crate::android::DEFAULT_SWIPE_MS;
use crate::types::TargetOs;
use std::fmt;

/// Image extensions accepted for screenshot filenames as typed
const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg"];

pub const ADB_USAGE: &str = "Supported ADB commands: devices, tap <x> <y>, \
swipe <x1> <y1> <x2> <y2> [duration_ms], text <string to type>, intent <action> [data_uri]";

/// Lines printed by `help`
pub const HELP: &[&str] = &[
    "hello                                   Greeting",
    "open <name> [on windows|android]        Launch an application or package",
    "list <path>                             List a directory",
    "system <shutdown|restart> [confirm]     Power commands",
    "screenshot [android|windows] [file]     Capture the screen",
    "adb [-s <serial>] devices               List connected devices",
    "adb [-s <serial>] tap <x> <y>           Tap",
    "adb [-s <serial>] swipe <x1> <y1> <x2> <y2> [ms]",
    "adb [-s <serial>] text <words...>       Type text",
    "adb [-s <serial>] intent <action> [uri] Start an intent",
    "exit                                    Leave the console",
];

/// Subcommands of `adb`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdbAction {
    Devices,
    Tap {
        x: i32,
        y: i32,
    },
    Swipe {
        from: (i32, i32),
        to: (i32, i32),
        duration_ms: u32,
    },
    Text(String),
    Intent {
        action: String,
        data_uri: Option<String>,
    },
}

/// A parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Blank input
    Empty,
    Hello,
    Help,
    Open {
        target: String,
        os: TargetOs,
    },
    List {
        path: String,
    },
    System {
        key: String,
        confirmed: bool,
    },
    Screenshot {
        os: TargetOs,
        filename: String,
    },
    Adb {
        device: Option<String>,
        action: AdbAction,
    },
}

impl Command {
    /// Backend the command needs, if any
    pub fn target(&self) -> Option<TargetOs> {
        match self {
            Command::Empty | Command::Hello | Command::Help => None,
            Command::Open { os, .. } | Command::Screenshot { os, .. } => Some(*os),
            Command::List { .. } | Command::System { .. } => Some(TargetOs::Windows),
            Command::Adb { .. } => Some(TargetOs::Android),
        }
    }
}

/// Why a line could not be turned into a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Unknown keyword or missing arguments
    NotRecognized(String),
    /// Known keyword with unusable arguments
    Invalid(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::NotRecognized(line) => write!(
                f,
                "Jarvis: Command '{}' not recognized or arguments missing.",
                line
            ),
            ParseError::Invalid(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for ParseError {}

/// Tokens of a line in original and lower case
struct Tokens<'a> {
    raw: Vec<&'a str>,
    lower: Vec<String>,
}

impl<'a> Tokens<'a> {
    fn new(line: &'a str) -> Self {
        let raw: Vec<&str> = line.split_whitespace().collect();
        let lower = raw.iter().map(|t| t.to_lowercase()).collect();
        Self { raw, lower }
    }

    fn len(&self) -> usize {
        self.raw.len()
    }

    fn keyword(&self, i: usize) -> Option<&str> {
        self.lower.get(i).map(String::as_str)
    }
}

/// Parse one console line
pub fn parse(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    let tokens = Tokens::new(line);
    let not_recognized = || ParseError::NotRecognized(line.to_string());

    let Some(action) = tokens.keyword(0) else {
        return Ok(Command::Empty);
    };

    match action {
        "hello" => Ok(Command::Hello),
        "help" => Ok(Command::Help),
        "open" if tokens.len() > 1 => parse_open(&tokens.raw[1..], &tokens.lower[1..]),
        "list" if tokens.len() > 1 => Ok(Command::List {
            path: tokens.raw[1..].join(" "),
        }),
        "system" if tokens.len() > 1 => Ok(Command::System {
            key: tokens.lower[1].clone(),
            confirmed: tokens.keyword(2) == Some("confirm"),
        }),
        "screenshot" => Ok(parse_screenshot(&tokens)),
        "adb" if tokens.len() > 1 => parse_adb(&tokens.raw[1..], &tokens.lower[1..]),
        _ => Err(not_recognized()),
    }
}

/// `open <target...> [on <os>]`; only a trailing `on <os>` selects the backend
fn parse_open(raw: &[&str], lower: &[String]) -> Result<Command, ParseError> {
    let n = raw.len();
    let suffix = if n >= 2 && lower[n - 2] == "on" {
        TargetOs::from_keyword(&lower[n - 1])
    } else {
        None
    };

    let (target, os) = match suffix {
        Some(os) => (raw[..n - 2].join(" "), os),
        None => (raw.join(" "), TargetOs::Windows),
    };

    if target.is_empty() {
        return Err(ParseError::Invalid(
            "Jarvis: No application name specified for 'open' command.".into(),
        ));
    }
    Ok(Command::Open { target, os })
}

/// `screenshot [android|windows] [filename]`
fn parse_screenshot(tokens: &Tokens) -> Command {
    let (os, name) = match tokens.keyword(1).and_then(TargetOs::from_keyword) {
        Some(os) => (os, tokens.raw.get(2)),
        None => (TargetOs::Windows, tokens.raw.get(1)),
    };
    let filename = match name {
        Some(name) => with_image_extension(name),
        None => format!("jarvis_screenshot_{}.png", os),
    };
    Command::Screenshot { os, filename }
}

fn with_image_extension(name: &str) -> String {
    let lower = name.to_lowercase();
    if IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        name.to_string()
    } else {
        format!("{}.png", name)
    }
}

/// `adb [-s <serial>] <subcommand> [args...]`
fn parse_adb(raw: &[&str], lower: &[String]) -> Result<Command, ParseError> {
    let (device, raw, lower) = match lower.first().map(String::as_str) {
        Some("-s") if raw.len() > 2 => (Some(raw[1].to_string()), &raw[2..], &lower[2..]),
        Some("-s") => {
            return Err(ParseError::Invalid(
                "Jarvis (Droid) Error: '-s' needs a device serial followed by a command.".into(),
            ))
        }
        _ => (None, raw, lower),
    };

    let sub = lower[0].as_str();
    let args = &raw[1..];
    let action = match sub {
        "devices" => AdbAction::Devices,
        "tap" if args.len() == 2 => {
            let coords = parse_ints(args).ok_or_else(|| {
                ParseError::Invalid(
                    "Jarvis (Droid) Error: Invalid coordinates for tap. Usage: adb tap <x> <y>"
                        .into(),
                )
            })?;
            AdbAction::Tap {
                x: coords[0],
                y: coords[1],
            }
        }
        "swipe" if args.len() == 4 || args.len() == 5 => {
            let invalid = || {
                ParseError::Invalid(
                    "Jarvis (Droid) Error: Invalid coordinates/duration for swipe. \
                     Usage: adb swipe <x1> <y1> <x2> <y2> [duration_ms]"
                        .into(),
                )
            };
            let c = parse_ints(&args[..4]).ok_or_else(invalid)?;
            let duration_ms = match args.get(4) {
                Some(ms) => ms.parse().map_err(|_| invalid())?,
                None => DEFAULT_SWIPE_MS,
            };
            AdbAction::Swipe {
                from: (c[0], c[1]),
                to: (c[2], c[3]),
                duration_ms,
            }
        }
        "text" if !args.is_empty() => AdbAction::Text(args.join(" ")),
        "intent" if args.len() == 1 || args.len() == 2 => AdbAction::Intent {
            action: args[0].to_string(),
            data_uri: args.get(1).map(|s| s.to_string()),
        },
        _ => {
            return Err(ParseError::Invalid(format!(
                "Jarvis (Droid): Unknown ADB sub-command '{}' or incorrect arguments. {}",
                sub, ADB_USAGE
            )))
        }
    };
    Ok(Command::Adb { device, action })
}

fn parse_ints(args: &[&str]) -> Option<Vec<i32>> {
    args.iter().map(|a| a.parse().ok()).collect()
}
