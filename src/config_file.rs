//! Tool configuration file handling.
//!
//! Configuration is JSON with every field optional. Values are layered:
//! built-in defaults, then the file passed with `--config`, then CLI flags
//! (applied in `main`).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::logic::resolver::DEFAULT_SERVICE_SUFFIX;
use crate::types::PackageBackend;

/// Default program used to elevate mutating commands.
pub const DEFAULT_ELEVATE_WITH: &str = "sudo";

/// pkgsvc configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Package-manager command profile
    pub backend: PackageBackend,
    /// Elevation program for install/start/stop. `null` disables elevation.
    pub elevate_with: Option<String>,
    /// Suffix identifying service-definition files in a package manifest
    pub service_suffix: String,
    /// Skip mutating commands
    pub dry_run: bool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            backend: PackageBackend::default(),
            elevate_with: Some(DEFAULT_ELEVATE_WITH.to_string()),
            service_suffix: DEFAULT_SERVICE_SUFFIX.to_string(),
            dry_run: false,
        }
    }
}

impl ToolConfig {
    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize configuration to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {:?}", path.as_ref()))?;

        let config: Self =
            serde_json::from_str(&content).context("Failed to parse configuration JSON")?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let suffix = &self.service_suffix;
        if suffix.is_empty() {
            anyhow::bail!("service_suffix must not be empty");
        }
        if suffix.contains(char::is_whitespace) || suffix.contains('/') {
            anyhow::bail!("service_suffix cannot contain whitespace or '/': {:?}", suffix);
        }

        if let Some(elevator) = &self.elevate_with {
            if elevator.trim().is_empty() {
                anyhow::bail!("elevate_with must not be empty (use null to disable elevation)");
            }
            if elevator.contains(char::is_whitespace) {
                anyhow::bail!("elevate_with must be a single program name: {:?}", elevator);
            }
        }

        Ok(())
    }
}
