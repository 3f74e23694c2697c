//! Common types for the Jarvis library

use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend a command is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetOs {
    Windows,
    Android,
}

impl TargetOs {
    /// Parse a lower-cased target keyword
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "windows" => Some(TargetOs::Windows),
            "android" => Some(TargetOs::Android),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetOs::Windows => "windows",
            TargetOs::Android => "android",
        }
    }
}

impl fmt::Display for TargetOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one console command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    /// Whether the command did what was asked
    pub success: bool,
    /// Human-readable summary
    pub message: String,
    /// Itemized output such as directory entries or device serials
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl CommandResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }
}
