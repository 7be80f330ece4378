//! Service-manager collaborator (systemd)
//!
//! Start and stop go through `systemctl` with elevation. Status is a plain
//! read-only `systemctl status` whose text is handed back verbatim: an
//! inactive or unknown unit is still just text for the user to read.

use tracing::{info, warn};

use crate::command_runner::{CommandOutcome, CommandRunner, CommandSpec};
use crate::types::ServiceAction;

/// Outcome of a start/stop request.
///
/// Failures here are reported, never propagated: the run continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlResult {
    Succeeded { dry_run: bool },
    Failed { detail: String },
}

impl ControlResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Status text as printed by the service manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// Raw collaborator output, never interpreted.
    pub text: String,
    /// Whether the status query exited zero. `systemctl status` exits
    /// non-zero for inactive units, so this is informational only.
    pub query_succeeded: bool,
}

/// systemd service manager driven through a `CommandRunner`.
pub struct ServiceManager<R> {
    runner: R,
    elevate_with: Option<String>,
}

impl<R: CommandRunner> ServiceManager<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            elevate_with: None,
        }
    }

    /// Prefix start/stop with `elevate_with` (e.g. `sudo`).
    pub fn with_elevation(mut self, elevate_with: Option<String>) -> Self {
        self.elevate_with = elevate_with;
        self
    }

    /// The `systemctl` invocation for `action` on `service`.
    ///
    /// Start and stop are mutating and elevated; status is neither.
    pub fn command(&self, service: &str, action: ServiceAction) -> CommandSpec {
        let spec = CommandSpec::new("systemctl").args([action.as_str(), service]);
        if action.is_mutating() {
            spec.mutating().elevated(self.elevate_with.as_deref())
        } else {
            spec
        }
    }

    pub fn start(&self, service: &str) -> ControlResult {
        self.control(service, ServiceAction::Start)
    }

    pub fn stop(&self, service: &str) -> ControlResult {
        self.control(service, ServiceAction::Stop)
    }

    fn control(&self, service: &str, action: ServiceAction) -> ControlResult {
        let spec = self.command(service, action);
        info!(service, action = %action, command = %spec, "controlling service");

        let outcome = self.runner.run(&spec);
        if outcome.succeeded {
            info!(service, action = %action, "service action succeeded");
            ControlResult::Succeeded {
                dry_run: outcome.dry_run,
            }
        } else {
            let detail = outcome.diagnostic();
            warn!(service, action = %action, detail = %detail, "service action failed");
            ControlResult::Failed { detail }
        }
    }

    /// Status text for `service`, verbatim.
    ///
    /// When the query produced nothing on stdout, its stderr is returned so
    /// the caller still sees the collaborator's own words (e.g. "Unit
    /// foo.service could not be found.").
    pub fn status(&self, service: &str) -> StatusReport {
        let outcome = self.runner.run(&self.command(service, ServiceAction::Status));
        if !outcome.succeeded {
            warn!(service, exit_code = ?outcome.exit_code, "status query exited non-zero");
        }
        status_text(outcome)
    }
}

fn status_text(outcome: CommandOutcome) -> StatusReport {
    let text = if outcome.stdout.trim().is_empty() {
        outcome.stderr
    } else {
        outcome.stdout
    };
    StatusReport {
        text,
        query_succeeded: outcome.succeeded,
    }
}
