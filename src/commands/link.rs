//! The `link` command: load a run configuration and process its links.
use anyhow::Result;

use crate::cli::LinkOpts;
use crate::error::ConfigError;
use crate::linker::Linker;
use crate::linker::hooks::{LinkTemplate, ProjectLayout};

/// Run the link command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, a parameter
/// override is malformed, or any declared link fails to resolve.
pub fn run(opts: &LinkOpts) -> Result<()> {
    let overrides = parse_overrides(&opts.params)?;

    let template: Option<Box<dyn LinkTemplate>> = opts
        .project_layout
        .then(|| Box::new(ProjectLayout) as Box<dyn LinkTemplate>);

    let linker = Linker::from_config(
        &opts.config,
        &overrides,
        opts.packages_dir.clone(),
        template,
    )?;
    let created = linker.run()?;

    tracing::info!("package link completed ({created} links)");
    Ok(())
}

/// Split repeated `-p key=value` arguments into pairs.
fn parse_overrides(params: &[String]) -> Result<Vec<(String, String)>, ConfigError> {
    params
        .iter()
        .map(|raw| {
            raw.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| ConfigError::InvalidOverride(raw.clone()))
        })
        .collect()
}
