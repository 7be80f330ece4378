//! Collaborator command execution
//!
//! Every interaction with the package manager and the service manager goes
//! through the `CommandRunner` trait. A command is described by a
//! `CommandSpec` and its result is always a `CommandOutcome` value: failing
//! to spawn, exiting non-zero, and succeeding are all just outcomes. Callers
//! decide which of those matter.
//!
//! `SystemRunner` is the production implementation. It executes programs
//! directly (never through a shell), gives them a parent-death signal, and
//! registers their PIDs with `ChildRegistry` while they run. Commands that do
//! not need the terminal also get their own process group.

use crate::process_guard::{ChildRegistry, CommandProcessGroup};
use std::fmt;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Description of one collaborator invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    /// Changes host state (install, start, stop). Skipped in dry-run mode.
    pub mutating: bool,
    /// Needs the controlling terminal, e.g. for a `sudo` password prompt.
    /// Such commands stay in the foreground process group and inherit stdin.
    pub needs_terminal: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            mutating: false,
            needs_terminal: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn mutating(mut self) -> Self {
        self.mutating = true;
        self
    }

    /// Prefix the command with an elevation program such as `sudo`.
    ///
    /// `sudo` resets the environment, so any variables are carried across
    /// with `env KEY=VALUE` after the elevation program. `None` leaves the
    /// command untouched.
    pub fn elevated(self, elevate_with: Option<&str>) -> Self {
        let Some(elevator) = elevate_with else {
            return self;
        };

        let mut args = Vec::with_capacity(self.args.len() + self.env.len() + 2);
        if !self.env.is_empty() {
            args.push("env".to_string());
            args.extend(self.env.iter().map(|(k, v)| format!("{}={}", k, v)));
        }
        args.push(self.program);
        args.extend(self.args);

        Self {
            program: elevator.to_string(),
            args,
            env: Vec::new(),
            mutating: self.mutating,
            needs_terminal: true,
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Result of one collaborator invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutcome {
    /// Whether the command exited successfully (exit code 0).
    pub succeeded: bool,
    /// Exit code (None if terminated by signal or never spawned).
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// Whether the command was skipped because dry-run mode is on.
    pub dry_run: bool,
}

impl CommandOutcome {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            exit_code: Some(0),
            stdout: stdout.into(),
            ..Self::default()
        }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            exit_code: Some(exit_code),
            stderr: stderr.into(),
            ..Self::default()
        }
    }

    /// Outcome for a program that could not be started at all.
    pub fn spawn_failure(error: impl fmt::Display) -> Self {
        Self {
            succeeded: false,
            exit_code: None,
            stderr: error.to_string(),
            ..Self::default()
        }
    }

    /// Best diagnostic text for a failure: stderr, then stdout, then the
    /// exit code.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        match self.exit_code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Executes collaborator commands.
pub trait CommandRunner {
    fn run(&self, spec: &CommandSpec) -> CommandOutcome;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, spec: &CommandSpec) -> CommandOutcome {
        (**self).run(spec)
    }
}

/// Runs commands on the host.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    dry_run: bool,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// In dry-run mode mutating commands are logged and skipped. Queries
    /// still execute so the preview is realistic.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> CommandOutcome {
        if self.dry_run && spec.mutating {
            info!(command = %spec, "dry run, skipping mutating command");
            return CommandOutcome {
                succeeded: true,
                exit_code: Some(0),
                stdout: format!("[DRY RUN] Skipped: {}\n", spec),
                stderr: String::new(),
                dry_run: true,
            };
        }

        debug!(command = %spec, env = ?spec.env, "executing collaborator command");

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if spec.needs_terminal {
            // A background process group would be stopped by SIGTTIN as soon
            // as the elevation program reads the password from the tty.
            cmd.stdin(Stdio::inherit()).with_parent_death_signal();
        } else {
            cmd.stdin(Stdio::null()).in_new_process_group();
        }
        for (key, value) in &spec.env {
            cmd.env(key, value);
        }

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                debug!(program = %spec.program, error = %e, "failed to spawn command");
                return CommandOutcome::spawn_failure(format!(
                    "failed to run {}: {}",
                    spec.program, e
                ));
            }
        };
        let pid = child.id();

        if let Ok(mut registry) = ChildRegistry::global().lock() {
            registry.register(pid);
        }

        let output = child.wait_with_output();

        if let Ok(mut registry) = ChildRegistry::global().lock() {
            registry.unregister(pid);
        }

        match output {
            Ok(output) => {
                let outcome = CommandOutcome {
                    succeeded: output.status.success(),
                    exit_code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                    dry_run: false,
                };
                debug!(
                    command = %spec,
                    succeeded = outcome.succeeded,
                    exit_code = ?outcome.exit_code,
                    "command finished"
                );
                outcome
            }
            Err(e) => CommandOutcome::spawn_failure(format!(
                "failed waiting for {}: {}",
                spec.program, e
            )),
        }
    }
}
