//! Service name resolution
//!
//! Works out which service unit a package ships by scanning the package's
//! file manifest for service-definition files.
//!
//! # Resolution Rules
//!
//! | Manifest                          | Resolved To |
//! |-----------------------------------|-------------|
//! | One or more `*<suffix>` entries   | Base filename of the first one, in listing order |
//! | No `*<suffix>` entries            | The package name, unchanged |
//! | Listing query failed              | The package name, unchanged |
//!
//! This is a heuristic. A package whose unit has an unrelated name, or that
//! ships several units with no declared primary one, may resolve to the wrong
//! unit. Every candidate is kept in `ServiceResolution::candidates` so the
//! caller can see the ambiguity.

use tracing::{debug, warn};

use crate::command_runner::CommandRunner;
use crate::package_manager::PackageManager;
use crate::types::PackageName;

/// Default suffix marking a path as a systemd service definition.
pub const DEFAULT_SERVICE_SUFFIX: &str = ".service";

/// Where a resolved service name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// A service-definition file in the package manifest.
    Manifest,
    /// No definition found (or no manifest): the package name was used.
    Fallback,
}

/// Result of service-name resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResolution {
    /// The service identifier to act on.
    pub name: String,
    /// Every service-definition base filename in the manifest, in order.
    pub candidates: Vec<String>,
    pub source: ResolutionSource,
}

impl ServiceResolution {
    fn fallback(package: &PackageName) -> Self {
        Self {
            name: package.as_str().to_string(),
            candidates: Vec::new(),
            source: ResolutionSource::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == ResolutionSource::Fallback
    }
}

/// Base filename of `path` (the part after the last `/`).
fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Resolve a service name from an already-fetched manifest.
///
/// `listing` is `None` when the listing query failed. Pure: no I/O.
pub fn resolve_from_listing(
    package: &PackageName,
    listing: Option<&[String]>,
    suffix: &str,
) -> ServiceResolution {
    let Some(listing) = listing else {
        return ServiceResolution::fallback(package);
    };

    let candidates: Vec<String> = listing
        .iter()
        .map(|path| base_name(path.trim()))
        .filter(|name| name.len() > suffix.len() && name.ends_with(suffix))
        .map(str::to_string)
        .collect();

    match candidates.first() {
        Some(first) => ServiceResolution {
            name: first.clone(),
            candidates: candidates.clone(),
            source: ResolutionSource::Manifest,
        },
        None => ServiceResolution::fallback(package),
    }
}

/// Resolve the service name for `package` by querying its manifest.
///
/// Never fails: a failed listing query or a manifest without service
/// definitions falls back to the package name.
pub fn resolve_service_name<R: CommandRunner>(
    packages: &PackageManager<R>,
    package: &PackageName,
    suffix: &str,
) -> ServiceResolution {
    let listing = packages.list_files(package);
    let resolution = resolve_from_listing(package, listing.as_deref(), suffix);

    match resolution.source {
        ResolutionSource::Manifest if resolution.candidates.len() > 1 => {
            warn!(
                package = %package,
                service = %resolution.name,
                candidates = ?resolution.candidates,
                "package ships several service units, using the first"
            );
        }
        ResolutionSource::Manifest => {
            debug!(package = %package, service = %resolution.name, "resolved service from manifest");
        }
        ResolutionSource::Fallback => {
            debug!(
                package = %package,
                listing_available = listing.is_some(),
                "no service definition found, using package name"
            );
        }
    }

    resolution
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkg(name: &str) -> PackageName {
        PackageName::new(name).unwrap()
    }

    fn listing(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_first_service_file_wins() {
        let files = listing(&["/usr/bin/foo", "/lib/systemd/system/foo.service", "/etc/foo.conf"]);
        let resolution = resolve_from_listing(&pkg("foo"), Some(files.as_slice()), DEFAULT_SERVICE_SUFFIX);

        assert_eq!(resolution.name, "foo.service");
        assert_eq!(resolution.source, ResolutionSource::Manifest);
        assert_eq!(resolution.candidates, vec!["foo.service"]);
    }

    #[test]
    fn test_all_candidates_are_kept_in_order() {
        let files = listing(&[
            "/lib/systemd/system/php8.3-fpm.service",
            "/usr/sbin/php-fpm8.3",
            "/lib/systemd/system/php8.3-fpm-reload.service",
        ]);
        let resolution = resolve_from_listing(&pkg("php8.3-fpm"), Some(files.as_slice()), DEFAULT_SERVICE_SUFFIX);

        assert_eq!(resolution.name, "php8.3-fpm.service");
        assert_eq!(resolution.candidates, vec!["php8.3-fpm.service", "php8.3-fpm-reload.service"]);
    }

    #[test]
    fn test_no_match_falls_back_to_package() {
        let files = listing(&["/usr/sbin/nginx", "/etc/nginx/nginx.conf"]);
        let resolution = resolve_from_listing(&pkg("nginx"), Some(files.as_slice()), DEFAULT_SERVICE_SUFFIX);

        assert_eq!(resolution.name, "nginx");
        assert!(resolution.is_fallback());
        assert!(resolution.candidates.is_empty());
    }

    #[test]
    fn test_failed_listing_falls_back_to_package() {
        let resolution = resolve_from_listing(&pkg("nginx"), None, DEFAULT_SERVICE_SUFFIX);
        assert_eq!(resolution.name, "nginx");
        assert!(resolution.is_fallback());
    }

    #[test]
    fn test_empty_listing_falls_back_to_package() {
        let resolution = resolve_from_listing(&pkg("nginx"), Some(&[][..]), DEFAULT_SERVICE_SUFFIX);
        assert!(resolution.is_fallback());
    }

    #[test]
    fn test_directory_named_like_suffix_is_ignored() {
        // Only the final path component counts
        let files = listing(&["/etc/foo.service/override.conf", "/lib/systemd/system/.service"]);
        let resolution = resolve_from_listing(&pkg("foo"), Some(files.as_slice()), DEFAULT_SERVICE_SUFFIX);
        assert!(resolution.is_fallback());
    }

    #[test]
    fn test_custom_suffix() {
        let files = listing(&["/lib/systemd/system/fstrim.timer", "/lib/systemd/system/fstrim.service"]);
        let resolution = resolve_from_listing(&pkg("util-linux"), Some(files.as_slice()), ".timer");
        assert_eq!(resolution.name, "fstrim.timer");
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("/lib/systemd/system/foo.service"), "foo.service");
        assert_eq!(base_name("foo.service"), "foo.service");
        assert_eq!(base_name("/"), "");
    }
}
