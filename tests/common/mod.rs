//! Shared test doubles for integration tests.

#![allow(dead_code)]

use std::cell::RefCell;

use pkgsvc::command_runner::{CommandOutcome, CommandRunner, CommandSpec};

/// Answers commands from a list of (prefix, outcome) rules and records every
/// command line it was asked to run.
///
/// Rules are matched against the rendered command line (`program args...`)
/// in insertion order. Unmatched commands fail with exit code 127.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Vec<(String, CommandOutcome)>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, prefix: &str, outcome: CommandOutcome) -> Self {
        self.rules.push((prefix.to_string(), outcome));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn ran(&self, prefix: &str) -> bool {
        self.calls.borrow().iter().any(|c| c.starts_with(prefix))
    }

    pub fn ran_any(&self, word: &str) -> bool {
        self.calls
            .borrow()
            .iter()
            .any(|c| c.split_whitespace().any(|w| w == word))
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, spec: &CommandSpec) -> CommandOutcome {
        let line = spec.to_string();
        self.calls.borrow_mut().push(line.clone());
        self.rules
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, outcome)| outcome.clone())
            .unwrap_or_else(|| CommandOutcome::failure(127, format!("unexpected command: {}", line)))
    }
}

/// Status text `systemctl status` prints for a running unit.
pub fn active_status(unit: &str) -> String {
    format!(
        "● {unit} - A high performance web server and a reverse proxy server\n     Loaded: loaded (/lib/systemd/system/{unit}; enabled)\n     Active: active (running)\n"
    )
}
