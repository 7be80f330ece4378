//! pkgsvc library
//!
//! Checks whether an OS package is installed, installs it when missing,
//! resolves the system service it ships and starts, stops or reports on that
//! service. The package manager and systemd are driven only through their
//! command-line tools.

pub mod cli;
pub mod command_runner;
pub mod config_file;
pub mod error;
pub mod logic;
pub mod package_manager;
pub mod process_guard;
pub mod prompt;
pub mod service_manager;
pub mod types;

// Re-export main types for convenience
pub use command_runner::{CommandOutcome, CommandRunner, CommandSpec, SystemRunner};
pub use config_file::ToolConfig;
pub use error::{PkgSvcError, Result};
pub use logic::resolver::{ResolutionSource, ServiceResolution, resolve_service_name};
pub use logic::workflow::{ActionSource, RunReport, Step, Workflow};
pub use package_manager::PackageManager;
pub use process_guard::{ChildRegistry, CommandProcessGroup, ProcessGuard};
pub use prompt::Prompter;
pub use service_manager::{ControlResult, ServiceManager, StatusReport};
pub use types::{PackageBackend, PackageName, ServiceAction};
