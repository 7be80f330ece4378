//! Package-service workflow
//!
//! One linear pass per run:
//!
//! ```text
//! package ─▶ installed? ─no──▶ install ─▶ resolve ─▶ start ─▶ status
//!                 │
//!                 └─yes─▶ resolve ─▶ ask action ─▶ start | stop | status
//! ```
//!
//! # Failure policy
//!
//! | Condition                          | Effect |
//! |------------------------------------|--------|
//! | Installed query fails to run       | Treated as "not installed" |
//! | Install fails                      | `Err(PkgSvcError::Install)`, nothing else runs |
//! | Listing fails / no unit file       | Package name used as service name |
//! | Start/stop fails                   | Reported, run completes |
//! | Status query exits non-zero        | Text printed verbatim, run completes |
//! | Unknown action                     | Reported, no command runs, run completes |
//!
//! Install is a precondition for everything after it, so it is the only
//! failure that becomes an error (and a non-zero exit in `main`).

use std::io::Write;
use tracing::{info, warn};

use crate::command_runner::CommandRunner;
use crate::config_file::ToolConfig;
use crate::error::Result;
use crate::logic::resolver::{ServiceResolution, resolve_service_name};
use crate::package_manager::PackageManager;
use crate::service_manager::{ControlResult, ServiceManager, StatusReport};
use crate::types::{PackageName, ServiceAction};

/// Supplies the action for an already-installed package.
///
/// Only consulted when the package was installed before the run started.
pub trait ActionSource {
    /// Raw, unvalidated action text. Validation happens in the workflow.
    fn next_action(&mut self, service: &str) -> Result<String>;
}

/// A fixed action string, for non-interactive callers and tests.
impl ActionSource for String {
    fn next_action(&mut self, _service: &str) -> Result<String> {
        Ok(self.clone())
    }
}

/// One thing the workflow did, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Installed { dry_run: bool },
    Control {
        action: ServiceAction,
        service: String,
        result: ControlResult,
    },
    Status { service: String, report: StatusReport },
    InvalidAction { input: String },
}

/// What happened during a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub package: PackageName,
    /// Whether the package was already present when the run began.
    pub was_installed: bool,
    pub resolution: ServiceResolution,
    pub steps: Vec<Step>,
}

impl RunReport {
    /// Whether any dispatched service command failed. Informational only:
    /// these failures do not change the exit status.
    pub fn had_service_failure(&self) -> bool {
        self.steps.iter().any(|step| {
            matches!(
                step,
                Step::Control {
                    result: ControlResult::Failed { .. },
                    ..
                }
            )
        })
    }
}

/// Single-pass orchestration over the package and service managers.
pub struct Workflow<R> {
    packages: PackageManager<R>,
    services: ServiceManager<R>,
    service_suffix: String,
}

impl<R: CommandRunner + Clone> Workflow<R> {
    pub fn new(runner: R, config: &ToolConfig) -> Self {
        Self {
            packages: PackageManager::new(runner.clone(), config.backend)
                .with_elevation(config.elevate_with.clone()),
            services: ServiceManager::new(runner).with_elevation(config.elevate_with.clone()),
            service_suffix: config.service_suffix.clone(),
        }
    }
}

impl<R: CommandRunner> Workflow<R> {
    /// Run the workflow for `package`, writing user-facing lines to `out`.
    ///
    /// # Errors
    ///
    /// `PkgSvcError::Install` if the package was missing and could not be
    /// installed; `PkgSvcError::Io` if `out` fails; any error from `actions`.
    pub fn run(
        &self,
        package: &PackageName,
        actions: &mut dyn ActionSource,
        out: &mut dyn Write,
    ) -> Result<RunReport> {
        let was_installed = self.packages.is_installed(package);
        info!(package = %package, was_installed, "starting workflow");

        let mut steps = Vec::new();

        if !was_installed {
            writeln!(out, "📦 Package '{}' is not installed. Installing...", package)?;
            let outcome = self.packages.install(package)?;
            writeln!(out, "✓ Package '{}' installed{}", package, dry_run_note(outcome.dry_run))?;
            steps.push(Step::Installed {
                dry_run: outcome.dry_run,
            });
        } else {
            writeln!(out, "✓ Package '{}' is already installed", package)?;
        }

        let resolution = resolve_service_name(&self.packages, package, &self.service_suffix);
        write_resolution(out, &resolution)?;
        let service = resolution.name.clone();

        if !was_installed {
            steps.push(self.control(&service, ServiceAction::Start, out)?);
            steps.push(self.status(&service, out)?);
        } else {
            let input = actions.next_action(&service)?;
            match ServiceAction::from_input(&input) {
                Some(ServiceAction::Status) => steps.push(self.status(&service, out)?),
                Some(action) => steps.push(self.control(&service, action, out)?),
                None => {
                    warn!(input = %input.trim(), "invalid action");
                    writeln!(
                        out,
                        "Invalid action: '{}'. Expected one of: start, stop, status",
                        input.trim()
                    )?;
                    steps.push(Step::InvalidAction {
                        input: input.trim().to_string(),
                    });
                }
            }
        }

        Ok(RunReport {
            package: package.clone(),
            was_installed,
            resolution,
            steps,
        })
    }

    fn control(&self, service: &str, action: ServiceAction, out: &mut dyn Write) -> Result<Step> {
        let result = match action {
            ServiceAction::Stop => self.services.stop(service),
            _ => self.services.start(service),
        };

        match &result {
            ControlResult::Succeeded { dry_run } => writeln!(
                out,
                "✓ Service '{}' {}{}",
                service,
                past_tense(action),
                dry_run_note(*dry_run)
            )?,
            ControlResult::Failed { detail } => writeln!(
                out,
                "✗ Failed to {} service '{}': {}",
                action, service, detail
            )?,
        }

        Ok(Step::Control {
            action,
            service: service.to_string(),
            result,
        })
    }

    fn status(&self, service: &str, out: &mut dyn Write) -> Result<Step> {
        let report = self.services.status(service);
        out.write_all(report.text.as_bytes())?;
        if !report.text.is_empty() && !report.text.ends_with('\n') {
            writeln!(out)?;
        }
        Ok(Step::Status {
            service: service.to_string(),
            report,
        })
    }
}

fn write_resolution(out: &mut dyn Write, resolution: &ServiceResolution) -> Result<()> {
    if resolution.is_fallback() {
        writeln!(out, "Service: {} (no unit file found, using package name)", resolution.name)?;
    } else {
        writeln!(out, "Service: {}", resolution.name)?;
        if resolution.candidates.len() > 1 {
            writeln!(out, "  other units in package: {}", resolution.candidates[1..].join(", "))?;
        }
    }
    Ok(())
}

fn past_tense(action: ServiceAction) -> &'static str {
    match action {
        ServiceAction::Start => "started",
        ServiceAction::Stop => "stopped",
        ServiceAction::Status => "queried",
    }
}

fn dry_run_note(dry_run: bool) -> &'static str {
    if dry_run { " (dry run)" } else { "" }
}
