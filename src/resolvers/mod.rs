//! Source resolution: package URIs and literal paths to local directories.
//!
//! A link source is either a remote URI (`scheme:identifier[@ref][#subpath]`)
//! handled by one of a small, closed set of resolvers, or a literal
//! filesystem path. The registry dispatches on a pure scheme-prefix
//! match in registration order; when nothing matches, the engine treats
//! the string as a path and canonicalizes it.
//!
//! Resolvers may perform network and process I/O. Their fetch failures
//! propagate as [`SourceError::Resolution`] with the cause attached; the
//! engine never retries.

pub mod git;
pub mod nuget;

use std::path::{Path, PathBuf};

use crate::error::SourceError;

/// The remote source resolvers, in dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceResolver {
    /// `nuget:` package-manager sources fetched via the `nuget` CLI.
    Nuget,
    /// `git:` version-control sources cloned via libgit2.
    Git,
}

impl SourceResolver {
    /// The URI scheme prefix this resolver recognizes.
    #[must_use]
    pub const fn scheme(self) -> &'static str {
        match self {
            Self::Nuget => "nuget:",
            Self::Git => "git:",
        }
    }
}

/// Resolver registry plus the shared packages directory remote sources
/// are fetched into.
#[derive(Debug)]
pub struct Registry {
    resolvers: Vec<SourceResolver>,
    packages_dir: Option<PathBuf>,
}

impl Registry {
    /// Create a registry with the standard resolver chain.
    #[must_use]
    pub fn new(packages_dir: Option<PathBuf>) -> Self {
        Self {
            resolvers: vec![SourceResolver::Nuget, SourceResolver::Git],
            packages_dir,
        }
    }

    /// Find the resolver whose scheme prefixes `source`, if any.
    ///
    /// First match in registration order wins. `None` means the string
    /// is a literal filesystem path.
    #[must_use]
    pub fn match_resolver(&self, source: &str) -> Option<SourceResolver> {
        let normalized = source.trim();
        self.resolvers
            .iter()
            .copied()
            .find(|r| normalized.starts_with(r.scheme()))
    }

    /// Fetch a remote source and return the local directory holding it.
    ///
    /// Must only be called with a URI for which [`Self::match_resolver`]
    /// returned the given resolver.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::PackagesDirRequired`] when no packages
    /// directory was configured, or [`SourceError::Resolution`] when the
    /// fetch fails.
    pub fn resolve_remote(
        &self,
        resolver: SourceResolver,
        source: &str,
    ) -> Result<PathBuf, SourceError> {
        let normalized = source.trim();
        let packages_dir =
            self.packages_dir
                .as_deref()
                .ok_or_else(|| SourceError::PackagesDirRequired {
                    scheme: resolver.scheme(),
                })?;

        let stripped = normalized
            .strip_prefix(resolver.scheme())
            .unwrap_or(normalized);
        let uri = SourceUri::parse(stripped);

        match resolver {
            SourceResolver::Nuget => nuget::resolve(normalized, &uri, packages_dir),
            SourceResolver::Git => git::resolve(normalized, &uri, packages_dir),
        }
    }
}

/// Parsed `identifier[@ref][#subpath]` micro-syntax (scheme already
/// stripped).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUri {
    /// The package identifier or repository URL.
    pub identifier: String,
    /// Branch, tag or version named after `@`.
    pub reference: Option<String>,
    /// Sub-directory of the fetched content named after `#`.
    pub subpath: Option<String>,
}

impl SourceUri {
    /// Split a source identifier into its parts.
    ///
    /// A leading `git@` names an SSH user, not a reference separator, so
    /// the `@` search skips it.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let (rest, subpath) = raw.find('#').map_or((raw, None), |i| {
            (&raw[..i], Some(raw[i + 1..].to_string()))
        });

        let search_start = if rest.starts_with("git@") { 4 } else { 0 };
        let (identifier, reference) = rest[search_start..].find('@').map_or_else(
            || (rest.to_string(), None),
            |i| {
                let at = search_start + i;
                (rest[..at].to_string(), Some(rest[at + 1..].to_string()))
            },
        );

        Self {
            identifier,
            reference: reference.filter(|r| !r.is_empty()),
            subpath: subpath.filter(|s| !s.is_empty()),
        }
    }
}

/// Canonicalize a literal source path: resolve links and make absolute
/// when the path exists, otherwise just absolutize it lexically.
#[must_use]
pub fn canonical(path: &str) -> PathBuf {
    let raw = Path::new(path);
    dunce::canonicalize(raw)
        .or_else(|_| std::path::absolute(raw))
        .unwrap_or_else(|_| raw.to_path_buf())
}
