//! Domain-specific error types for the package linking engine.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Internal modules return typed errors (e.g., [`ConfigError`],
//! [`TemplateError`]) while command handlers at the CLI boundary convert
//! them to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! LinkerError
//! ├── Config(ConfigError)      — malformed/incomplete declarations, parameters
//! ├── Template(TemplateError)  — undefined variables, template syntax
//! ├── Source(SourceError)      — source resolution and remote fetch failures
//! ├── Linkspec(LinkspecError)  — malformed package descriptors
//! └── Fs(FsLinkError)          — filesystem link safety violations
//! ```
//!
//! Every error is fatal to the current run: nothing is retried and nothing
//! is downgraded to a warning. The first error aborts the run.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the package linking engine.
///
/// Aggregates domain-specific sub-errors and is convertible to
/// [`anyhow::Error`] for use at CLI command boundaries.
#[derive(Error, Debug)]
pub enum LinkerError {
    /// Configuration-related error (declarations, parameters, parsing).
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Template rendering error (undefined variable, syntax).
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Source resolution error (missing path, failed remote fetch).
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Package descriptor error (malformed linkspec file).
    #[error("linkspec error: {0}")]
    Linkspec(#[from] LinkspecError),

    /// Filesystem link error (safety rails, I/O failures).
    #[error("link error: {0}")]
    Fs(#[from] FsLinkError),
}

/// Errors that arise from run configurations and link declarations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A declaration defines none of `source`, `content`, `links`.
    #[error("either \"source\", \"content\" or \"links\" must be defined")]
    Incomplete,

    /// Flat-mode resolution reached the leaf without a usable target.
    #[error("\"target\" is undefined and no links were found in the linkspec")]
    MissingTarget,

    /// A child link declaration has no `target`.
    #[error("child link declaration is missing \"target\"")]
    MissingChildTarget,

    /// A child link declaration has neither `source` nor `content`.
    #[error("child link declaration needs \"source\" or \"content\"")]
    MissingChildSource,

    /// A user-declared parameter collides with an engine-reserved name.
    #[error("parameter \"{0}\" is reserved and cannot be declared")]
    ReservedParameter(String),

    /// A required parameter is absent from the environment.
    #[error("missing required parameter \"{0}\"")]
    MissingParameter(String),

    /// A command-line parameter override is not of the form `key=value`.
    #[error("invalid parameter override \"{0}\", expected key=value")]
    InvalidOverride(String),

    /// A content/exclude glob pattern is malformed.
    #[error("invalid glob pattern \"{pattern}\": {source}")]
    Glob {
        /// The rendered pattern that failed to parse.
        pattern: String,
        /// Underlying pattern error.
        source: glob::PatternError,
    },

    /// The run configuration file contains invalid YAML.
    #[error("invalid configuration {path}: {source}")]
    Parse {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_yaml::Error,
    },

    /// An I/O error occurred while reading a configuration file.
    #[error("reading configuration {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise from template rendering.
///
/// The renderer is deliberately strict: a reference to an undefined
/// variable is fatal rather than substituting an empty string, because a
/// silently-empty path segment would place a link at the wrong location
/// without warning.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// The template references a parameter absent from the environment.
    #[error("undefined parameter \"{name}\" in template \"{template}\"")]
    UndefinedVariable {
        /// Name of the missing parameter.
        name: String,
        /// The offending template text.
        template: String,
    },

    /// The template itself is malformed.
    #[error("syntax error in template \"{template}\": {message}")]
    Syntax {
        /// The offending template text.
        template: String,
        /// Parser diagnostic.
        message: String,
    },
}

/// Errors that arise while resolving a source URI or path.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The resolved source path does not exist or is not a directory.
    #[error("source path \"{0}\" not found")]
    NotFound(PathBuf),

    /// A remote resolver failed to fetch the source.
    #[error("failed to resolve \"{uri}\": {source}")]
    Resolution {
        /// The URI that could not be resolved.
        uri: String,
        /// Underlying fetch/tool failure.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A remote resolver needs a packages directory but none was given.
    #[error("\"{scheme}\" sources require a packages directory, see --packages-dir")]
    PackagesDirRequired {
        /// Scheme of the resolver that needed the directory.
        scheme: &'static str,
    },
}

/// Errors that arise from parsing a package descriptor file.
#[derive(Error, Debug)]
pub enum LinkspecError {
    /// The descriptor file could not be parsed.
    #[error("invalid linkspec {path}: {source}")]
    Parse {
        /// Path to the descriptor file.
        path: PathBuf,
        /// Underlying parse error (YAML or XML).
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The descriptor parsed but violates the schema.
    #[error("invalid linkspec {path}: {reason}")]
    Invalid {
        /// Path to the descriptor file.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// An I/O error occurred while reading the descriptor.
    #[error("reading linkspec {path}: {source}")]
    Io {
        /// Path to the descriptor file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise from the filesystem link primitive.
#[derive(Error, Debug)]
pub enum FsLinkError {
    /// The link source does not exist.
    #[error("link source \"{0}\" does not exist")]
    SourceNotFound(PathBuf),

    /// The link target already exists and `forced` was not set.
    #[error("path \"{0}\" already exists")]
    AlreadyExists(PathBuf),

    /// The link target exists as a real file or directory, not a link.
    ///
    /// This is the safety rail against destroying real content: it fires
    /// even under `forced`.
    #[error("path \"{0}\" exists but is not a link")]
    NotALink(PathBuf),

    /// An I/O operation on the filesystem failed.
    #[error("{op} {path}: {source}")]
    Io {
        /// Short description of the failing operation.
        op: &'static str,
        /// Path the operation was acting on.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::io;

    // -----------------------------------------------------------------------
    // ConfigError
    // -----------------------------------------------------------------------

    #[test]
    fn config_error_incomplete_display() {
        let e = ConfigError::Incomplete;
        assert_eq!(
            e.to_string(),
            "either \"source\", \"content\" or \"links\" must be defined"
        );
    }

    #[test]
    fn config_error_reserved_parameter_display() {
        let e = ConfigError::ReservedParameter("__source__".to_string());
        assert_eq!(
            e.to_string(),
            "parameter \"__source__\" is reserved and cannot be declared"
        );
    }

    #[test]
    fn config_error_io_has_source() {
        use std::error::Error as StdError;
        let e = ConfigError::Io {
            path: PathBuf::from("/conf/links.yaml"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert!(e.source().is_some());
    }

    // -----------------------------------------------------------------------
    // TemplateError
    // -----------------------------------------------------------------------

    #[test]
    fn template_error_undefined_variable_names_the_variable() {
        let e = TemplateError::UndefinedVariable {
            name: "y".to_string(),
            template: "{{x}}/{{y}}".to_string(),
        };
        assert!(e.to_string().contains("\"y\""));
        assert!(e.to_string().contains("{{x}}/{{y}}"));
    }

    #[test]
    fn template_error_syntax_carries_template_text() {
        let e = TemplateError::Syntax {
            template: "{{ unclosed".to_string(),
            message: "unexpected end of input".to_string(),
        };
        assert!(e.to_string().contains("{{ unclosed"));
    }

    // -----------------------------------------------------------------------
    // SourceError
    // -----------------------------------------------------------------------

    #[test]
    fn source_error_not_found_display() {
        let e = SourceError::NotFound(PathBuf::from("/missing/pkg"));
        assert_eq!(e.to_string(), "source path \"/missing/pkg\" not found");
    }

    #[test]
    fn source_error_resolution_has_source() {
        use std::error::Error as StdError;
        let e = SourceError::Resolution {
            uri: "git:https://example.com/repo.git".to_string(),
            source: "connection refused".into(),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("git:https://example.com/repo.git"));
    }

    #[test]
    fn source_error_packages_dir_required_display() {
        let e = SourceError::PackagesDirRequired { scheme: "nuget:" };
        assert!(e.to_string().contains("--packages-dir"));
    }

    // -----------------------------------------------------------------------
    // FsLinkError
    // -----------------------------------------------------------------------

    #[test]
    fn fs_error_not_a_link_display() {
        let e = FsLinkError::NotALink(PathBuf::from("/real/dir"));
        assert_eq!(e.to_string(), "path \"/real/dir\" exists but is not a link");
    }

    #[test]
    fn fs_error_already_exists_display() {
        let e = FsLinkError::AlreadyExists(PathBuf::from("/target"));
        assert_eq!(e.to_string(), "path \"/target\" already exists");
    }

    #[test]
    fn fs_error_io_display() {
        let e = FsLinkError::Io {
            op: "removing link",
            path: PathBuf::from("/target"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(e.to_string().contains("removing link"));
        assert!(e.to_string().contains("/target"));
    }

    // -----------------------------------------------------------------------
    // LinkerError conversions
    // -----------------------------------------------------------------------

    #[test]
    fn linker_error_from_config_error() {
        let e: LinkerError = ConfigError::Incomplete.into();
        assert!(e.to_string().contains("configuration error"));
    }

    #[test]
    fn linker_error_from_template_error() {
        let e: LinkerError = TemplateError::Syntax {
            template: "{%".to_string(),
            message: "bad".to_string(),
        }
        .into();
        assert!(e.to_string().contains("template error"));
    }

    #[test]
    fn linker_error_from_fs_error() {
        let e: LinkerError = FsLinkError::NotALink(PathBuf::from("/x")).into();
        assert!(e.to_string().contains("link error"));
    }

    // -----------------------------------------------------------------------
    // Send + Sync bounds
    // -----------------------------------------------------------------------

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<LinkerError>();
        assert_send_sync::<ConfigError>();
        assert_send_sync::<TemplateError>();
        assert_send_sync::<SourceError>();
        assert_send_sync::<LinkspecError>();
        assert_send_sync::<FsLinkError>();
    }

    // -----------------------------------------------------------------------
    // anyhow conversion
    // -----------------------------------------------------------------------

    #[test]
    fn linker_error_converts_to_anyhow() {
        let e: LinkerError = ConfigError::MissingTarget.into();
        let _anyhow_err: anyhow::Error = e.into();
    }
}
