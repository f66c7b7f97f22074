//! Git-style source resolution via libgit2.
//!
//! Each distinct `identifier[@ref]` pair gets its own cache directory
//! under the packages directory. An existing clone is reused (and
//! fetched) only when its `origin` still points at the requested URL;
//! anything else in the way is discarded and cloned fresh.

use std::path::{Path, PathBuf};

use git2::build::CheckoutBuilder;
use git2::{BranchType, ObjectType, Repository};

use super::SourceUri;
use crate::error::SourceError;

/// Clone or update a repository and return the effective source path.
///
/// `@ref` may name a remote branch or a tag; either is checked out
/// detached. `#subpath` selects a sub-directory of the working tree.
///
/// # Errors
///
/// Returns [`SourceError::Resolution`] on clone/fetch/checkout failure
/// or when the reference names neither a branch nor a tag.
pub fn resolve(raw: &str, uri: &SourceUri, packages_dir: &Path) -> Result<PathBuf, SourceError> {
    let resolution = |source: Box<dyn std::error::Error + Send + Sync>| SourceError::Resolution {
        uri: raw.to_string(),
        source,
    };

    std::fs::create_dir_all(packages_dir).map_err(|e| resolution(Box::new(e)))?;

    let clone_dir = packages_dir.join(cache_key(&uri.identifier, uri.reference.as_deref()));
    let repo = open_or_clone(&uri.identifier, &clone_dir).map_err(|e| resolution(Box::new(e)))?;

    if let Some(reference) = &uri.reference {
        checkout(&repo, reference).map_err(|e| resolution(Box::new(e)))?;
    }

    Ok(match &uri.subpath {
        Some(subpath) => clone_dir.join(subpath),
        None => clone_dir,
    })
}

/// Directory name for a clone: identifier plus optional ref, with path
/// and URL separators flattened.
fn cache_key(identifier: &str, reference: Option<&str>) -> String {
    let id = reference.map_or_else(
        || identifier.to_string(),
        |r| format!("{identifier}.{r}"),
    );
    id.chars()
        .map(|c| if matches!(c, '.' | ':' | '/' | '\\') { '_' } else { c })
        .collect()
}

/// Reuse a valid existing clone (fetching updates) or clone afresh.
fn open_or_clone(url: &str, clone_dir: &Path) -> Result<Repository, git2::Error> {
    if clone_dir.is_dir() {
        if let Ok(repo) = Repository::open(clone_dir) {
            let origin_matches = repo
                .find_remote("origin")
                .is_ok_and(|remote| remote.url() == Some(url));
            if origin_matches {
                let mut remote = repo.find_remote("origin")?;
                remote.fetch(&[] as &[&str], None, None)?;
                drop(remote);
                return Ok(repo);
            }
        }
        // Not the clone we made: throw it away rather than guess.
        std::fs::remove_dir_all(clone_dir)
            .map_err(|e| git2::Error::from_str(&e.to_string()))?;
    }
    Repository::clone(url, clone_dir)
}

/// Check out a remote branch or tag, detached.
fn checkout(repo: &Repository, reference: &str) -> Result<(), git2::Error> {
    let object = repo
        .find_branch(&format!("origin/{reference}"), BranchType::Remote)
        .and_then(|branch| branch.get().peel(ObjectType::Commit))
        .or_else(|_| {
            repo.revparse_single(&format!("refs/tags/{reference}"))
                .and_then(|obj| obj.peel(ObjectType::Commit))
        })
        .map_err(|_| {
            git2::Error::from_str(&format!("\"{reference}\" is not a valid branch or tag"))
        })?;

    let mut options = CheckoutBuilder::new();
    options.force();
    repo.checkout_tree(&object, Some(&mut options))?;
    repo.set_head_detached(object.id())?;
    Ok(())
}
