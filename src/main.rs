//! pkgsvc - main entry point
//!
//! Wires logging, signal handling and configuration around the interactive
//! workflow. Exit status is non-zero only when a package could not be
//! installed (or no package name could be read, or configuration is invalid).

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use pkgsvc::cli::{Cli, Commands, ConfigCommands};
use pkgsvc::command_runner::SystemRunner;
use pkgsvc::config_file::ToolConfig;
use pkgsvc::logic::workflow::Workflow;
use pkgsvc::process_guard::{self, ProcessGuard};
use pkgsvc::prompt::Prompter;

/// Initialize the tracing subscriber. Logs go to stderr so stdout stays
/// reserved for prompts and collaborator output.
fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Defaults, then the config file, then CLI flags.
fn load_config(cli: &Cli) -> anyhow::Result<ToolConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            info!(path = %path.display(), "loading configuration");
            ToolConfig::load_from_file(path)?
        }
        None => ToolConfig::default(),
    };
    cli.apply_to(&mut config);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_logging(cli.log_level());

    if let Err(e) = process_guard::init_signal_handlers() {
        // Cleanup still happens through ProcessGuard's Drop
        warn!(error = %e, "failed to initialize signal handlers");
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %format!("{:#}", e), "configuration error");
            eprintln!("✗ {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Some(Commands::Config { action }) => run_config_command(action, &config),
        None => run_interactive(&config),
    }
}

/// Prompt for a package and run the workflow against the host.
fn run_interactive(config: &ToolConfig) -> ExitCode {
    let _guard = ProcessGuard::new();

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());

    let package = match prompter.ask_package() {
        Ok(package) => package,
        Err(e) => {
            eprintln!("✗ {}", e);
            return ExitCode::FAILURE;
        }
    };

    if config.dry_run {
        println!("🔧 Dry run: install, start and stop will be skipped");
    }

    let runner = SystemRunner::new().with_dry_run(config.dry_run);
    let workflow = Workflow::new(runner, config);

    match workflow.run(&package, &mut prompter, &mut io::stdout()) {
        Ok(report) => {
            info!(
                package = %report.package,
                service = %report.resolution.name,
                was_installed = report.was_installed,
                service_failure = report.had_service_failure(),
                "run complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(package = %package, error = %e, "run aborted");
            eprintln!("✗ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_config_command(action: ConfigCommands, config: &ToolConfig) -> ExitCode {
    let result = match action {
        ConfigCommands::Show => serde_json::to_string_pretty(config)
            .map(|json| println!("{}", json))
            .context("Failed to serialize configuration"),
        ConfigCommands::Save { path } => config.save_to_file(&path).map(|()| {
            println!("✓ Configuration saved to {}", path.display());
        }),
        ConfigCommands::Validate { path } => ToolConfig::load_from_file(&path)
            .and_then(|file_config| file_config.validate())
            .map(|()| println!("✓ Configuration file is valid: {}", path.display())),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{:#}", e), "config command failed");
            eprintln!("✗ {:#}", e);
            ExitCode::FAILURE
        }
    }
}
