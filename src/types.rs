//! Type-safe domain types for pkgsvc
//!
//! Closed enumerations for the service action and the package backend, and a
//! validated package identifier. Raw strings from the prompt are converted
//! here and nowhere else.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};

use crate::error::PkgSvcError;

/// Action requested against an already-installed package's service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ServiceAction {
    Start,
    Stop,
    Status,
}

impl ServiceAction {
    /// Parse raw user input: surrounding whitespace is ignored and case does
    /// not matter. Returns `None` for anything outside the closed set.
    pub fn from_input(input: &str) -> Option<Self> {
        input.trim().parse().ok()
    }

    /// The `systemctl` verb for this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Status => "status",
        }
    }

    /// Whether this action changes service state on the host.
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Self::Status)
    }
}

/// Host package-manager command profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum PackageBackend {
    /// dpkg/apt-get (Debian, Ubuntu)
    #[default]
    Apt,
    /// pacman (Arch Linux)
    Pacman,
    /// rpm/dnf (Fedora, RHEL)
    Dnf,
}

/// Validated package identifier.
///
/// Opaque to this tool. The only rules are the ones that keep the name from
/// being misread by the collaborator: non-empty, no whitespace or control
/// characters, and no leading `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageName(String);

impl PackageName {
    pub fn new(raw: &str) -> Result<Self, PkgSvcError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(PkgSvcError::validation("package name cannot be empty"));
        }
        if name.starts_with('-') {
            return Err(PkgSvcError::validation(format!(
                "package name cannot start with '-': {}",
                name
            )));
        }
        if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(PkgSvcError::validation(format!(
                "package name cannot contain whitespace: {:?}",
                name
            )));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PackageName {
    type Err = PkgSvcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PackageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
