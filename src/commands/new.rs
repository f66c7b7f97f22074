//! The `new` command: scaffold a starter package directory.
use anyhow::{Context, Result, bail};
use std::path::Path;

use crate::cli::NewOpts;

/// Starter run configuration written into new packages.
const PACKAGE_CONFIG: &str = include_str!("templates/package-config.yaml");
/// Starter linkspec written into new packages.
const LINKSPEC: &str = include_str!("templates/linkspec.yaml");
/// Starter ignore file written into new packages.
const GITIGNORE: &str = include_str!("templates/gitignore");

/// Subdirectories every scaffolded package starts with.
const SUBDIRS: [&str; 4] = ["assets", "plugins", "settings", "project"];

/// Run the new command.
///
/// # Errors
///
/// Returns an error if the location already exists or any directory or
/// starter file cannot be created.
pub fn run(opts: &NewOpts) -> Result<()> {
    let location = &opts.location;
    if location.exists() {
        bail!("location '{}' already exists", location.display());
    }

    for subdir in SUBDIRS {
        let path = location.join(subdir);
        std::fs::create_dir_all(&path)
            .with_context(|| format!("creating {}", path.display()))?;
    }

    write_starter(location, "package-config.yaml", PACKAGE_CONFIG)?;
    write_starter(location, "linkspec.yaml", LINKSPEC)?;
    write_starter(location, ".gitignore", GITIGNORE)?;

    tracing::info!("package created at {}", location.display());
    Ok(())
}

fn write_starter(location: &Path, name: &str, content: &str) -> Result<()> {
    let path = location.join(name);
    std::fs::write(&path, content).with_context(|| format!("writing {}", path.display()))
}
