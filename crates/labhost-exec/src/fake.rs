//! Scripted runner for tests
//!
//! `FakeRunner` answers commands from a prefix-matched script and records
//! everything it was asked to run, so resource logic can be tested without
//! touching a real host.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ExecError;
use crate::result::CommandResult;
use crate::traits::SystemRunner;

struct Rule {
    prefix: String,
    response: CommandResult,
}

/// In-memory runner answering from a prefix script.
///
/// The first rule whose prefix matches the start of the command wins;
/// unmatched commands get the default response (success, empty output).
pub struct FakeRunner {
    rules: Mutex<Vec<Rule>>,
    default: CommandResult,
    history: Mutex<Vec<String>>,
}

impl FakeRunner {
    /// Runner that answers success to everything.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: Mutex::new(Vec::new()),
            default: CommandResult::ok(""),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Runner whose unmatched commands fail with the given status.
    #[must_use]
    pub fn failing_with(status: i32) -> Self {
        Self {
            default: CommandResult::with_status(status, ""),
            ..Self::new()
        }
    }

    /// Script a response for commands starting with `prefix`.
    #[must_use]
    pub fn on(self, prefix: impl Into<String>, response: CommandResult) -> Self {
        self.rules.lock().unwrap().push(Rule {
            prefix: prefix.into(),
            response,
        });
        self
    }

    /// Replace or add a scripted response after construction.
    pub fn set_response(&self, prefix: impl Into<String>, response: CommandResult) {
        let prefix = prefix.into();
        let mut rules = self.rules.lock().unwrap();
        if let Some(rule) = rules.iter_mut().find(|r| r.prefix == prefix) {
            rule.response = response;
        } else {
            rules.push(Rule { prefix, response });
        }
    }

    /// Every command issued so far, in order.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.history.lock().unwrap().clone()
    }

    /// Number of issued commands starting with `prefix`.
    #[must_use]
    pub fn count_matching(&self, prefix: &str) -> usize {
        self.history
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }
}

impl Default for FakeRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SystemRunner for FakeRunner {
    async fn run(&self, cmd: &str) -> Result<CommandResult, ExecError> {
        self.history.lock().unwrap().push(cmd.to_string());

        let rules = self.rules.lock().unwrap();
        let response = rules
            .iter()
            .find(|r| cmd.starts_with(&r.prefix))
            .map_or(&self.default, |r| &r.response);
        Ok(response.clone())
    }

    fn runner_type(&self) -> &'static str {
        "fake"
    }
}
