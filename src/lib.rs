//! Declarative package linking engine.
//!
//! Given a YAML run configuration (parameters plus an ordered list of
//! link declarations), paklink materializes a directory tree of
//! filesystem links (symlinks, junctions, hard links) and selectively
//! copied content. Sources may be local directories or remote packages
//! fetched on demand via `nuget:`/`git:` URIs.
//!
//! The public API is organised in layers:
//!
//! - **[`config`]** — parse and validate run configurations and linkspecs
//! - **[`resolvers`]** — turn source URIs and paths into local directories
//! - **[`template`]** / **[`params`]** — strict parameter expansion
//! - **[`resources`]** — the filesystem link primitive and helpers
//! - **[`linker`]** — the link resolution engine and configuration runner
//! - **[`commands`]** — top-level subcommand orchestration (`link`, `new`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod linker;
pub mod logging;
pub mod params;
pub mod resolvers;
pub mod resources;
pub mod template;
