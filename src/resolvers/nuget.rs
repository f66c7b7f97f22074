//! NuGet-style package resolution.
//!
//! Delegates the actual fetch to the `nuget` command-line tool; this
//! module only derives the install layout (`<packages-dir>/<id>.<version>`)
//! and the effective source inside it.

use std::path::{Path, PathBuf};

use super::SourceUri;
use crate::error::SourceError;
use crate::exec;

/// Fetch a package and return the local directory for its content.
///
/// Versions are pinned string literals: a missing `@version` reference is
/// an error, never an implicit "latest".
///
/// # Errors
///
/// Returns [`SourceError::Resolution`] when the URI has no version, the
/// packages directory cannot be created, or the `nuget` invocation fails.
pub fn resolve(raw: &str, uri: &SourceUri, packages_dir: &Path) -> Result<PathBuf, SourceError> {
    let resolution = |source: Box<dyn std::error::Error + Send + Sync>| SourceError::Resolution {
        uri: raw.to_string(),
        source,
    };

    let Some(version) = uri.reference.as_deref() else {
        return Err(resolution("a pinned @version is required".into()));
    };

    std::fs::create_dir_all(packages_dir).map_err(|e| resolution(Box::new(e)))?;

    let output_dir = packages_dir.to_string_lossy().to_string();
    exec::run(
        "nuget",
        &[
            "install",
            &uri.identifier,
            "-Version",
            version,
            "-OutputDirectory",
            &output_dir,
        ],
    )
    .map_err(|e| resolution(e.into()))?;

    let mut path = packages_dir.join(format!("{}.{}", uri.identifier, version));
    if let Some(subpath) = &uri.subpath {
        path = path.join(subpath);
    }
    Ok(path)
}
