// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed workspace with builders for
// package directories, linkspecs and run configuration files, so each
// integration test can set up an isolated tree without repeating
// filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// An isolated workspace backed by a [`tempfile::TempDir`].
///
/// The directory is automatically deleted when dropped.
pub struct TestTree {
    root: tempfile::TempDir,
}

impl TestTree {
    /// Create an empty workspace.
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().expect("create temp dir"),
        }
    }

    /// Path to the workspace root.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Absolute path below the workspace root.
    pub fn join(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }

    /// Create a directory (and parents) below the root.
    pub fn mkdir(&self, rel: &str) -> PathBuf {
        let path = self.join(rel);
        std::fs::create_dir_all(&path).expect("create dir");
        path
    }

    /// Write a file below the root, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(&path, content).expect("write file");
        path
    }

    /// Create a package directory containing the given data files.
    ///
    /// Each entry is a path relative to the package directory; file
    /// content is the file's own name.
    pub fn package(&self, name: &str, files: &[&str]) -> PathBuf {
        let dir = self.mkdir(name);
        for file in files {
            let path = dir.join(file);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("create parent");
            }
            std::fs::write(&path, file).expect("write data file");
        }
        dir
    }

    /// Write a `linkspec.yaml` into an existing package directory.
    pub fn linkspec(&self, package: &str, content: &str) -> PathBuf {
        self.write(&format!("{package}/linkspec.yaml"), content)
    }
}

/// Whether `path` is a symlink (without following it).
pub fn is_symlink(path: &Path) -> bool {
    path.symlink_metadata()
        .map(|m| m.is_symlink())
        .unwrap_or(false)
}
