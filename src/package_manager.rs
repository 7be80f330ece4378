//! Package-manager collaborator
//!
//! Queries and installs packages by invoking the host package manager's
//! command-line tools. Nothing here parses package databases directly: the
//! collaborator's exit status and stdout are the whole interface.
//!
//! # Backends
//!
//! | Backend  | Installed query  | Install                               | File listing      |
//! |----------|------------------|---------------------------------------|-------------------|
//! | `apt`    | `dpkg -s <pkg>`  | `apt-get install -y <pkg>`            | `dpkg -L <pkg>`   |
//! | `pacman` | `pacman -Q <pkg>`| `pacman -S --noconfirm --needed <pkg>`| `pacman -Qlq <pkg>` |
//! | `dnf`    | `rpm -q <pkg>`   | `dnf install -y <pkg>`                | `rpm -ql <pkg>`   |
//!
//! Install is the only mutating command and the only one that is elevated.

use tracing::{debug, error, info};

use crate::command_runner::{CommandOutcome, CommandRunner, CommandSpec};
use crate::error::{PkgSvcError, Result};
use crate::types::{PackageBackend, PackageName};

/// Package manager driven through a `CommandRunner`.
pub struct PackageManager<R> {
    runner: R,
    backend: PackageBackend,
    elevate_with: Option<String>,
}

impl<R: CommandRunner> PackageManager<R> {
    /// Create a package manager for `backend`. Install commands are not
    /// elevated until `with_elevation` is called.
    pub fn new(runner: R, backend: PackageBackend) -> Self {
        Self {
            runner,
            backend,
            elevate_with: None,
        }
    }

    /// Prefix mutating commands with `elevate_with` (e.g. `sudo`).
    pub fn with_elevation(mut self, elevate_with: Option<String>) -> Self {
        self.elevate_with = elevate_with;
        self
    }

    pub fn backend(&self) -> PackageBackend {
        self.backend
    }

    /// Command that exits zero iff `package` is installed.
    pub fn query_command(&self, package: &PackageName) -> CommandSpec {
        match self.backend {
            PackageBackend::Apt => CommandSpec::new("dpkg").args(["-s", package.as_str()]),
            PackageBackend::Pacman => CommandSpec::new("pacman").args(["-Q", package.as_str()]),
            PackageBackend::Dnf => CommandSpec::new("rpm").args(["-q", package.as_str()]),
        }
    }

    /// Non-interactive install command for `package`.
    pub fn install_command(&self, package: &PackageName) -> CommandSpec {
        let spec = match self.backend {
            PackageBackend::Apt => CommandSpec::new("apt-get")
                .args(["install", "-y", package.as_str()])
                .env("DEBIAN_FRONTEND", "noninteractive"),
            PackageBackend::Pacman => CommandSpec::new("pacman")
                .args(["-S", "--noconfirm", "--needed", package.as_str()]),
            PackageBackend::Dnf => {
                CommandSpec::new("dnf").args(["install", "-y", package.as_str()])
            }
        };
        spec.mutating().elevated(self.elevate_with.as_deref())
    }

    /// Command that prints the paths owned by `package`, one per line.
    pub fn list_files_command(&self, package: &PackageName) -> CommandSpec {
        match self.backend {
            PackageBackend::Apt => CommandSpec::new("dpkg").args(["-L", package.as_str()]),
            PackageBackend::Pacman => CommandSpec::new("pacman").args(["-Qlq", package.as_str()]),
            PackageBackend::Dnf => CommandSpec::new("rpm").args(["-ql", package.as_str()]),
        }
    }

    /// Whether `package` is installed.
    ///
    /// Any failure of the query, including the query program being missing,
    /// means "not installed". This never errors.
    pub fn is_installed(&self, package: &PackageName) -> bool {
        let outcome = self.runner.run(&self.query_command(package));
        debug!(
            package = %package,
            installed = outcome.succeeded,
            exit_code = ?outcome.exit_code,
            "package installed query"
        );
        outcome.succeeded
    }

    /// Install `package` non-interactively.
    ///
    /// # Errors
    ///
    /// Returns `PkgSvcError::Install` carrying the collaborator's diagnostic
    /// output when the install command fails. Callers treat this as terminal.
    pub fn install(&self, package: &PackageName) -> Result<CommandOutcome> {
        let spec = self.install_command(package);
        info!(package = %package, command = %spec, "installing package");

        let outcome = self.runner.run(&spec);
        if !outcome.succeeded {
            let detail = outcome.diagnostic();
            error!(
                package = %package,
                exit_code = ?outcome.exit_code,
                detail = %detail,
                "package installation failed"
            );
            return Err(PkgSvcError::install(package.as_str(), detail));
        }

        info!(package = %package, dry_run = outcome.dry_run, "package installed");
        Ok(outcome)
    }

    /// Paths owned by `package`, or `None` if the listing query failed.
    pub fn list_files(&self, package: &PackageName) -> Option<Vec<String>> {
        let outcome = self.runner.run(&self.list_files_command(package));
        if !outcome.succeeded {
            debug!(
                package = %package,
                detail = %outcome.diagnostic(),
                "file listing query failed"
            );
            return None;
        }

        Some(
            outcome
                .stdout
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Answers every command with the same outcome and records what ran.
    struct FixedRunner {
        outcome: CommandOutcome,
        calls: RefCell<Vec<CommandSpec>>,
    }

    impl FixedRunner {
        fn new(outcome: CommandOutcome) -> Self {
            Self {
                outcome,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl CommandRunner for FixedRunner {
        fn run(&self, spec: &CommandSpec) -> CommandOutcome {
            self.calls.borrow_mut().push(spec.clone());
            self.outcome.clone()
        }
    }

    fn nginx() -> PackageName {
        PackageName::new("nginx").unwrap()
    }

    #[test]
    fn test_apt_commands() {
        let pm = PackageManager::new(FixedRunner::new(CommandOutcome::success("")), PackageBackend::Apt)
            .with_elevation(Some("sudo".to_string()));

        assert_eq!(pm.query_command(&nginx()).to_string(), "dpkg -s nginx");
        assert_eq!(pm.list_files_command(&nginx()).to_string(), "dpkg -L nginx");

        let install = pm.install_command(&nginx());
        assert_eq!(
            install.to_string(),
            "sudo env DEBIAN_FRONTEND=noninteractive apt-get install -y nginx"
        );
        assert!(install.mutating);
    }

    #[test]
    fn test_pacman_and_dnf_commands_without_elevation() {
        let runner = FixedRunner::new(CommandOutcome::success(""));
        let pacman = PackageManager::new(&runner, PackageBackend::Pacman);
        assert_eq!(pacman.query_command(&nginx()).to_string(), "pacman -Q nginx");
        assert_eq!(
            pacman.install_command(&nginx()).to_string(),
            "pacman -S --noconfirm --needed nginx"
        );
        assert_eq!(pacman.list_files_command(&nginx()).to_string(), "pacman -Qlq nginx");

        let dnf = PackageManager::new(&runner, PackageBackend::Dnf);
        assert_eq!(dnf.query_command(&nginx()).to_string(), "rpm -q nginx");
        assert_eq!(dnf.install_command(&nginx()).to_string(), "dnf install -y nginx");
        assert_eq!(dnf.list_files_command(&nginx()).to_string(), "rpm -ql nginx");
    }

    #[test]
    fn test_is_installed_follows_exit_status() {
        let yes = PackageManager::new(FixedRunner::new(CommandOutcome::success("Status: install ok installed")), PackageBackend::Apt);
        assert!(yes.is_installed(&nginx()));

        let no = PackageManager::new(FixedRunner::new(CommandOutcome::failure(1, "not installed")), PackageBackend::Apt);
        assert!(!no.is_installed(&nginx()));

        let missing = PackageManager::new(FixedRunner::new(CommandOutcome::spawn_failure("No such file")), PackageBackend::Apt);
        assert!(!missing.is_installed(&nginx()));
    }

    #[test]
    fn test_install_failure_carries_diagnostic() {
        let runner = FixedRunner::new(CommandOutcome::failure(100, "E: Unable to locate package badpkg\n"));
        let pm = PackageManager::new(&runner, PackageBackend::Apt);
        let pkg = PackageName::new("badpkg").unwrap();

        match pm.install(&pkg) {
            Err(PkgSvcError::Install { package, detail }) => {
                assert_eq!(package, "badpkg");
                assert_eq!(detail, "E: Unable to locate package badpkg");
            }
            other => panic!("Expected install error, got {:?}", other),
        }
        assert_eq!(runner.calls.borrow().len(), 1);
    }

    #[test]
    fn test_list_files_skips_blank_lines() {
        let listing = "/.\n/usr/sbin/nginx\n\n  /lib/systemd/system/nginx.service  \n";
        let pm = PackageManager::new(FixedRunner::new(CommandOutcome::success(listing)), PackageBackend::Apt);
        assert_eq!(
            pm.list_files(&nginx()),
            Some(vec![
                "/.".to_string(),
                "/usr/sbin/nginx".to_string(),
                "/lib/systemd/system/nginx.service".to_string(),
            ])
        );
    }

    #[test]
    fn test_list_files_failure_is_none() {
        let pm = PackageManager::new(FixedRunner::new(CommandOutcome::failure(1, "package 'nginx' is not installed")), PackageBackend::Apt);
        assert_eq!(pm.list_files(&nginx()), None);
    }
}
