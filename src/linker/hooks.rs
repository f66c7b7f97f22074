//! Optional pre-run hooks that derive conventional layouts from
//! parameters.
//!
//! A [`LinkTemplate`] lets a run configuration rely on parameters the
//! user never spells out: the expansion hook derives reserved parameters
//! from the seeded environment before the parameter loop runs, and the
//! pre-run hook performs one-time setup before any links are processed.

use std::path::PathBuf;

use crate::error::{ConfigError, FsLinkError, LinkerError};
use crate::params::{ParamEnv, Reserved};

/// Hook pair invoked by the configuration runner.
pub trait LinkTemplate: std::fmt::Debug {
    /// Derive extra reserved parameters from the seeded environment.
    ///
    /// Runs once, after command-line overrides are seeded and before the
    /// declared parameter loop.
    ///
    /// # Errors
    ///
    /// Returns an error when a parameter the hook depends on is missing.
    fn expand_params(&self, params: &mut ParamEnv) -> Result<(), LinkerError>;

    /// One-time setup before any links are processed.
    ///
    /// # Errors
    ///
    /// Returns an error when the setup work fails.
    fn pre_run(&self, params: &ParamEnv) -> Result<(), LinkerError>;
}

/// The conventional `<project>/assets/plugins` layout.
///
/// Requires a `project` parameter; binds `__project__`, `__assets__` and
/// `__plugins__`, and guarantees the plugins directory exists before the
/// first link is made.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProjectLayout;

impl ProjectLayout {
    /// The user parameter naming the project directory.
    pub const PROJECT_PARAM: &'static str = "project";
}

impl LinkTemplate for ProjectLayout {
    fn expand_params(&self, params: &mut ParamEnv) -> Result<(), LinkerError> {
        let Some(project) = params.get(Self::PROJECT_PARAM) else {
            return Err(ConfigError::MissingParameter(Self::PROJECT_PARAM.to_string()).into());
        };

        let project = crate::resolvers::canonical(project);
        let assets = project.join("assets");
        let plugins = assets.join("plugins");

        params.bind(Reserved::Project, project.display().to_string());
        params.bind(Reserved::Assets, assets.display().to_string());
        params.bind(Reserved::Plugins, plugins.display().to_string());
        Ok(())
    }

    fn pre_run(&self, params: &ParamEnv) -> Result<(), LinkerError> {
        if let Some(plugins) = params.get(Reserved::Plugins.name()) {
            std::fs::create_dir_all(plugins).map_err(|source| FsLinkError::Io {
                op: "creating plugins directory",
                path: PathBuf::from(plugins),
                source,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn expand_params_requires_project() {
        let mut env = ParamEnv::new();
        let err = ProjectLayout.expand_params(&mut env).unwrap_err();
        assert!(err.to_string().contains("project"));
    }

    #[test]
    fn expand_params_binds_layout_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let mut env = ParamEnv::new();
        env.declare("project", dir.path().to_string_lossy()).unwrap();

        ProjectLayout.expand_params(&mut env).unwrap();

        let assets = env.get("__assets__").unwrap();
        let plugins = env.get("__plugins__").unwrap();
        assert!(env.get("__project__").is_some());
        assert!(assets.ends_with("assets"));
        assert!(plugins.ends_with("plugins"));
    }

    #[test]
    fn pre_run_creates_the_plugins_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut env = ParamEnv::new();
        env.declare("project", dir.path().join("proj").to_string_lossy())
            .unwrap();

        ProjectLayout.expand_params(&mut env).unwrap();
        ProjectLayout.pre_run(&env).unwrap();

        assert!(dir.path().join("proj").join("assets").join("plugins").is_dir());
    }

    #[test]
    fn pre_run_without_expansion_is_a_noop() {
        ProjectLayout.pre_run(&ParamEnv::new()).unwrap();
    }
}
