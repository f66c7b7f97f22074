//! The filesystem link primitive.
//!
//! [`create_link`] is the single point where the engine touches the
//! filesystem to materialize a resolved link. It carries the safety
//! rails: a pre-existing *link* at the target is replaced under
//! `forced`, but a pre-existing *real* file or directory is never
//! touched — that case fails even when forced.

use std::path::Path;

use crate::error::FsLinkError;

use super::fs::ensure_parent_dir;

/// Kind of filesystem link created, inferred from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Directory link (symlink on Unix, symlink or junction on Windows).
    Directory,
    /// File link (symlink on Unix, symlink or hard link on Windows).
    File,
}

/// Create a filesystem link at `target` pointing to `source`.
///
/// - Fails if `source` does not exist.
/// - If `target` exists and `forced` is `false`, fails with
///   [`FsLinkError::AlreadyExists`].
/// - If `target` exists as a link and `forced` is `true`, the old link is
///   removed first (replace semantics — re-running is never an error).
/// - If `target` exists as a real file or directory, fails with
///   [`FsLinkError::NotALink`] regardless of `forced`.
/// - Otherwise intermediate parent directories are created as needed.
///
/// # Errors
///
/// Returns [`FsLinkError`] per the rules above, or an I/O variant when
/// the platform link operation itself fails.
pub fn create_link(source: &Path, target: &Path, forced: bool) -> Result<LinkKind, FsLinkError> {
    if !source.exists() {
        return Err(FsLinkError::SourceNotFound(source.to_path_buf()));
    }

    if target.exists() || target.symlink_metadata().is_ok() {
        if !forced {
            return Err(FsLinkError::AlreadyExists(target.to_path_buf()));
        }
        if !is_link(target) {
            return Err(FsLinkError::NotALink(target.to_path_buf()));
        }
        remove_link(target)?;
    } else {
        ensure_parent_dir(target)?;
    }

    let kind = if source.is_dir() {
        LinkKind::Directory
    } else {
        LinkKind::File
    };
    platform_create(source, target, kind)?;

    tracing::info!("linked {} -> {}", target.display(), source.display());
    Ok(kind)
}

/// Whether `path` is a filesystem link of any supported kind.
///
/// On Windows this includes directory junctions, which are reparse
/// points that [`std::fs::Metadata::is_symlink`] does not report.
#[must_use]
pub fn is_link(path: &Path) -> bool {
    let Ok(meta) = path.symlink_metadata() else {
        return false;
    };

    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        const FILE_ATTRIBUTE_REPARSE_POINT: u32 = 0x400;
        meta.is_symlink() || meta.file_attributes() & FILE_ATTRIBUTE_REPARSE_POINT != 0
    }
    #[cfg(not(windows))]
    {
        meta.is_symlink()
    }
}

/// Remove a link, handling platform differences.
///
/// On Windows, directory symlinks and junctions must be removed with
/// `remove_dir` (not `remove_file`); `symlink_metadata().is_dir()`
/// returns `false` for them, so the raw `FILE_ATTRIBUTE_DIRECTORY` flag
/// is checked instead.
pub fn remove_link(path: &Path) -> Result<(), FsLinkError> {
    let io_err = |source| FsLinkError::Io {
        op: "removing link",
        path: path.to_path_buf(),
        source,
    };

    let meta = path.symlink_metadata().map_err(io_err)?;
    if is_dir_like(&meta) {
        std::fs::remove_dir(path).map_err(io_err)?;
    } else {
        std::fs::remove_file(path).map_err(io_err)?;
    }
    Ok(())
}

/// Check if metadata represents a directory-like entry.
///
/// On Windows, `symlink_metadata().is_dir()` returns `false` for
/// directory symlinks and junctions, so the raw `FILE_ATTRIBUTE_DIRECTORY`
/// bit is checked instead.
fn is_dir_like(meta: &std::fs::Metadata) -> bool {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        const FILE_ATTRIBUTE_DIRECTORY: u32 = 0x10;
        meta.file_attributes() & FILE_ATTRIBUTE_DIRECTORY != 0
    }
    #[cfg(not(windows))]
    {
        meta.is_dir()
    }
}

/// Create the platform link.
#[cfg(unix)]
fn platform_create(source: &Path, target: &Path, _kind: LinkKind) -> Result<(), FsLinkError> {
    std::os::unix::fs::symlink(source, target).map_err(|io| FsLinkError::Io {
        op: "creating link",
        path: target.to_path_buf(),
        source: io,
    })
}

/// Create the platform link.
///
/// Tries the native symlink API first; when symlink creation is denied
/// (no Developer Mode, not elevated), falls back to a junction for
/// directories and a hard link for files.
#[cfg(windows)]
fn platform_create(source: &Path, target: &Path, kind: LinkKind) -> Result<(), FsLinkError> {
    let io_err = |io| FsLinkError::Io {
        op: "creating link",
        path: target.to_path_buf(),
        source: io,
    };

    let result = match kind {
        LinkKind::Directory => std::os::windows::fs::symlink_dir(source, target),
        LinkKind::File => std::os::windows::fs::symlink_file(source, target),
    };

    match result {
        Ok(()) => Ok(()),
        // OS error 5: symlink privilege not held.
        Err(e) if e.raw_os_error() == Some(5) => match kind {
            LinkKind::Directory => {
                let target_str = target.to_string_lossy().to_string();
                let source_str = source.to_string_lossy().to_string();
                crate::exec::run("cmd", &["/c", "mklink", "/J", &target_str, &source_str])
                    .map(|_| ())
                    .map_err(|err| FsLinkError::Io {
                        op: "creating junction",
                        path: target.to_path_buf(),
                        source: std::io::Error::other(err.to_string()),
                    })
            }
            LinkKind::File => std::fs::hard_link(source, target).map_err(io_err),
        },
        Err(e) => Err(io_err(e)),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn missing_source_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = create_link(
            &dir.path().join("absent"),
            &dir.path().join("target"),
            true,
        )
        .unwrap_err();
        assert!(matches!(err, FsLinkError::SourceNotFound(_)));
    }

    #[cfg(unix)]
    #[test]
    fn links_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("data.txt");
        let target = dir.path().join("out").join("data.txt");
        std::fs::write(&source, b"x").unwrap();

        let kind = create_link(&source, &target, false).unwrap();

        assert_eq!(kind, LinkKind::File);
        assert_eq!(std::fs::read_link(&target).unwrap(), source);
        assert_eq!(std::fs::read(&target).unwrap(), b"x");
    }

    #[cfg(unix)]
    #[test]
    fn links_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("pkg");
        std::fs::create_dir(&source).unwrap();
        std::fs::write(source.join("data.txt"), b"x").unwrap();
        let target = dir.path().join("dest").join("pkg");

        let kind = create_link(&source, &target, false).unwrap();

        assert_eq!(kind, LinkKind::Directory);
        assert!(target.join("data.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn existing_target_without_forced_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source");
        let target = dir.path().join("target");
        std::fs::write(&source, b"x").unwrap();
        std::os::unix::fs::symlink(&source, &target).unwrap();

        let err = create_link(&source, &target, false).unwrap_err();
        assert!(matches!(err, FsLinkError::AlreadyExists(_)));
    }

    #[cfg(unix)]
    #[test]
    fn forced_replaces_an_existing_link() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("old");
        let new = dir.path().join("new");
        let target = dir.path().join("target");
        std::fs::write(&old, b"old").unwrap();
        std::fs::write(&new, b"new").unwrap();
        std::os::unix::fs::symlink(&old, &target).unwrap();

        create_link(&new, &target, true).unwrap();

        assert_eq!(std::fs::read_link(&target).unwrap(), new);
        assert_eq!(std::fs::read(&target).unwrap(), b"new");
    }

    #[cfg(unix)]
    #[test]
    fn forced_never_clobbers_a_real_directory() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source");
        let target = dir.path().join("target");
        std::fs::create_dir(&source).unwrap();
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("precious.txt"), b"keep me").unwrap();

        let err = create_link(&source, &target, true).unwrap_err();

        assert!(matches!(err, FsLinkError::NotALink(_)));
        assert_eq!(
            std::fs::read(target.join("precious.txt")).unwrap(),
            b"keep me",
            "existing content must be untouched"
        );
    }

    #[cfg(unix)]
    #[test]
    fn forced_never_clobbers_a_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source");
        let target = dir.path().join("target");
        std::fs::write(&source, b"x").unwrap();
        std::fs::write(&target, b"real content").unwrap();

        let err = create_link(&source, &target, true).unwrap_err();
        assert!(matches!(err, FsLinkError::NotALink(_)));
    }

    #[cfg(unix)]
    #[test]
    fn forced_replaces_a_broken_link() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source");
        let target = dir.path().join("target");
        std::fs::write(&source, b"x").unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone"), &target).unwrap();

        create_link(&source, &target, true).unwrap();
        assert_eq!(std::fs::read_link(&target).unwrap(), source);
    }

    #[cfg(unix)]
    #[test]
    fn is_link_distinguishes_links_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        let link = dir.path().join("link");
        std::fs::write(&file, b"x").unwrap();
        std::os::unix::fs::symlink(&file, &link).unwrap();

        assert!(is_link(&link));
        assert!(!is_link(&file));
        assert!(!is_link(&dir.path().join("absent")));
    }

    #[cfg(unix)]
    #[test]
    fn remove_link_removes_directory_links() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("pkg");
        let target = dir.path().join("link");
        std::fs::create_dir(&source).unwrap();
        std::os::unix::fs::symlink(&source, &target).unwrap();

        remove_link(&target).unwrap();

        assert!(target.symlink_metadata().is_err());
        assert!(source.exists(), "link source must survive removal");
    }
}
