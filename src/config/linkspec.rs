//! Per-package link descriptors.
//!
//! A package may carry a `linkspec.yaml` describing how its content
//! should be exposed instead of being linked wholesale. Absence of a
//! descriptor is not an error — it simply means "link the whole
//! directory". Packages predating the YAML format may instead carry a
//! legacy XML `package.linkspec`, which is transformed into the same
//! shape by [`legacy`](super::legacy).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{ExternalLinkDeclaration, LinkDeclaration, collapse, legacy};
use crate::error::LinkspecError;

/// Filenames probed inside a package directory, in priority order.
const CANDIDATES: [&str; 4] = [
    "linkspec.yaml",
    "linkspec.yml",
    "content/linkspec.yaml",
    "content/linkspec.yml",
];

/// Filename of the legacy XML descriptor.
const LEGACY_NAME: &str = "package.linkspec";

/// The declarative link behavior of a single package.
///
/// Structurally a [`LinkDeclaration`] fragment scoped to one package
/// directory; all fields are optional and an entirely empty spec is the
/// behavior of a descriptor-less package.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkSpec {
    /// Package name, informational only.
    #[serde(default)]
    pub name: Option<String>,

    /// Target path template for the package's own content.
    #[serde(default)]
    pub target: Option<String>,

    /// Glob templates selecting content entries.
    #[serde(default)]
    pub content: Option<Vec<String>>,

    /// Glob templates removing entries from `content` selection.
    #[serde(default)]
    pub exclude: Option<Vec<String>>,

    /// Child-package fan-out declarations.
    #[serde(default)]
    pub links: Option<Vec<LinkDeclaration>>,

    /// Links injected from outside the package.
    #[serde(default)]
    pub external_links: Option<Vec<ExternalLinkDeclaration>>,
}

impl LinkSpec {
    /// Collapse empty lists to `None`, recursively.
    pub fn normalize(&mut self) {
        collapse(&mut self.content);
        collapse(&mut self.exclude);
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
        collapse(&mut self.external_links);
    }
}

/// Locate and parse the link descriptor of a package directory.
///
/// Search order: the YAML candidates (`linkspec.yaml`, `linkspec.yml`,
/// then both under a `content/` subdirectory), then the legacy XML
/// `package.linkspec`. Returns an empty spec and `None` when the package
/// carries no descriptor at all.
///
/// # Errors
///
/// Returns [`LinkspecError`] when a descriptor exists but cannot be read
/// or parsed.
pub fn load(package_dir: &Path) -> Result<(LinkSpec, Option<PathBuf>), LinkspecError> {
    for candidate in CANDIDATES {
        let path = package_dir.join(candidate);
        if path.is_file() {
            let mut spec = parse_yaml(&path)?;
            spec.normalize();
            return Ok((spec, Some(path)));
        }
    }

    let legacy_path = package_dir.join(LEGACY_NAME);
    if legacy_path.is_file() {
        let text = read(&legacy_path)?;
        let mut spec = legacy::transform(&text).map_err(|e| e.into_linkspec_error(&legacy_path))?;
        spec.normalize();
        return Ok((spec, Some(legacy_path)));
    }

    Ok((LinkSpec::default(), None))
}

fn parse_yaml(path: &Path) -> Result<LinkSpec, LinkspecError> {
    let text = read(path)?;
    serde_yaml::from_str(&text).map_err(|source| LinkspecError::Parse {
        path: path.to_path_buf(),
        source: Box::new(source),
    })
}

fn read(path: &Path) -> Result<String, LinkspecError> {
    std::fs::read_to_string(path).map_err(|source| LinkspecError::Io {
        path: path.to_path_buf(),
        source,
    })
}
