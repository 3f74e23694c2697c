//! Scripted adb transport for unit tests

use crate::adb::AdbTransport;
use crate::error::{JarvisError, Result};
use std::collections::VecDeque;
use std::rc::Rc;
use std::cell::RefCell;

/// One recorded invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub args: Vec<String>,
    pub device: Option<String>,
}

impl Call {
    pub fn joined(&self) -> String {
        self.args.join(" ")
    }
}

#[derive(Default)]
struct Script {
    responses: VecDeque<Result<String>>,
    calls: Vec<Call>,
}

/// Replays queued responses in order and records every call.
///
/// Clones share the same script, so a test can keep a handle after moving
/// the transport into an automator. Once the queue is empty every call
/// succeeds with empty output.
#[derive(Clone, Default)]
pub struct ScriptedAdb {
    script: Rc<RefCell<Script>>,
}

impl ScriptedAdb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, output: &str) -> &Self {
        self.script
            .borrow_mut()
            .responses
            .push_back(Ok(output.to_string()));
        self
    }

    pub fn fail(&self, command: &str, message: &str) -> &Self {
        self.script
            .borrow_mut()
            .responses
            .push_back(Err(JarvisError::AdbCommandFailed {
                command: command.to_string(),
                message: message.to_string(),
            }));
        self
    }

    pub fn fail_with(&self, err: JarvisError) -> &Self {
        self.script.borrow_mut().responses.push_back(Err(err));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.borrow().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.script.borrow().calls.len()
    }

    /// Forget recorded calls, keeping queued responses
    pub fn clear_calls(&self) {
        self.script.borrow_mut().calls.clear();
    }
}

impl AdbTransport for ScriptedAdb {
    async fn run(&self, args: &[String], device: Option<&str>) -> Result<String> {
        let mut script = self.script.borrow_mut();
        script.calls.push(Call {
            args: args.to_vec(),
            device: device.map(str::to_string),
        });
        script.responses.pop_front().unwrap_or_else(|| Ok(String::new()))
    }
}
