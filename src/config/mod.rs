//! Run configuration parsing and the link declaration data model.
//!
//! A run configuration is a YAML document with two top-level keys:
//!
//! ```yaml
//! params:
//!   output: '{{__dir__}}/build'
//! links:
//!   - source: packages/lib-a/content
//!     target: '{{output}}/lib-a'
//! ```
//!
//! `params` is an ordered mapping of parameter declarations (expanded in
//! file order by the runner) and `links` is an ordered list of
//! [`LinkDeclaration`]s. Declarations are parsed into explicit structs
//! and validated at load time so malformed configuration fails before
//! any filesystem work starts.

pub mod legacy;
pub mod linkspec;

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::ConfigError;

pub use linkspec::LinkSpec;

/// One entry in a run configuration's `links` list, or a nested child
/// link inside a linkspec.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkDeclaration {
    /// Source URI or template string. Optional when `content` or `links`
    /// drive the declaration.
    #[serde(default)]
    pub source: Option<String>,

    /// Target path template.
    #[serde(default)]
    pub target: Option<String>,

    /// Glob templates selecting individual entries of the source to link.
    #[serde(default)]
    pub content: Option<Vec<String>>,

    /// Glob templates removing matches from `content` selection.
    #[serde(default)]
    pub exclude: Option<Vec<String>>,

    /// Child-package fan-out: each child produces its own links.
    #[serde(default)]
    pub links: Option<Vec<LinkDeclaration>>,

    /// Links injected from outside the package into the resolved tree.
    #[serde(default)]
    pub external_links: Option<Vec<ExternalLinkDeclaration>>,
}

impl LinkDeclaration {
    /// Collapse empty lists to `None`, recursively.
    ///
    /// An empty `links:` (or `content:`, etc.) in YAML behaves exactly
    /// like an absent key, so the engine only ever branches on `Option`.
    pub fn normalize(&mut self) {
        collapse(&mut self.content);
        collapse(&mut self.exclude);
        collapse(&mut self.external_links);
        if let Some(children) = &mut self.links {
            for child in children.iter_mut() {
                child.normalize();
            }
        }
        collapse(&mut self.links);
        if let Some(externals) = &mut self.external_links {
            for external in externals.iter_mut() {
                collapse(&mut external.default_content);
            }
        }
    }

    /// Check that the declaration can be resolved at all.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Incomplete`] when `source`, `content` and
    /// `links` are all absent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.is_none() && self.content.is_none() && self.links.is_none() {
            return Err(ConfigError::Incomplete);
        }
        Ok(())
    }
}

/// Collapse `Some(empty)` to `None`.
fn collapse<T>(list: &mut Option<Vec<T>>) {
    if list.as_ref().is_some_and(Vec::is_empty) {
        *list = None;
    }
}

/// A link from outside the package injected into an already-resolved
/// parent, with optional one-time content seeding.
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalLinkDeclaration {
    /// Source path template (usually a `{{parameter}}` reference).
    pub source: String,

    /// Target path template inside the resolved tree.
    pub target: String,

    /// Glob templates naming content copied into the external target
    /// when (and only when) the destination entry does not exist yet.
    #[serde(default)]
    pub default_content: Option<Vec<String>>,
}

/// A parsed run configuration: ordered parameters plus ordered links.
#[derive(Debug, Default, Deserialize)]
pub struct RunConfig {
    /// Parameter declarations, expanded in file order.
    #[serde(default)]
    pub params: IndexMap<String, String>,

    /// Link declarations, processed in file order.
    #[serde(default)]
    pub links: Vec<LinkDeclaration>,
}

impl RunConfig {
    /// Load and validate a run configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Parse`] on invalid YAML, and
    /// [`ConfigError::Incomplete`] when a declaration defines none of
    /// `source`, `content`, `links`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config: Self =
            serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        for link in &mut config.links {
            link.normalize();
            link.validate()?;
        }
        Ok(config)
    }
}
