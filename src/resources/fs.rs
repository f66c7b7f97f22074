//! Shared filesystem helpers.
use std::path::Path;

use crate::error::FsLinkError;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<(), FsLinkError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| FsLinkError::Io {
            op: "creating parent directory",
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Copy a file or an entire directory tree from `source` to `target`.
///
/// Used for default-content seeding, where content must be materialized
/// as real files the user can edit rather than linked back to the
/// package. Symlinks within the source tree are followed, so their
/// content is copied, not the link itself.
///
/// # Errors
///
/// Returns an error if the source cannot be read or the destination
/// cannot be written.
pub fn copy_path(source: &Path, target: &Path) -> Result<(), FsLinkError> {
    if source.is_dir() {
        copy_dir_recursive(source, target)
    } else {
        ensure_parent_dir(target)?;
        std::fs::copy(source, target)
            .map(|_| ())
            .map_err(|io| FsLinkError::Io {
                op: "copying",
                path: source.to_path_buf(),
                source: io,
            })
    }
}

/// Recursively copy a directory tree.
fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<(), FsLinkError> {
    let io_err = |op: &'static str, path: &Path| {
        let path = path.to_path_buf();
        move |source| FsLinkError::Io { op, path, source }
    };

    std::fs::create_dir_all(dst).map_err(io_err("creating directory", dst))?;
    let entries = std::fs::read_dir(src).map_err(io_err("reading directory", src))?;
    for entry in entries {
        let entry = entry.map_err(io_err("reading directory", src))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)
                .map_err(io_err("copying", &src_path))?;
        }
    }
    Ok(())
}
