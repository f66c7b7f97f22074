use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the package linking tool.
#[derive(Parser, Debug)]
#[command(
    name = "paklink",
    about = "Declarative package linking tool",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Materialize the links declared in a run configuration
    Link(LinkOpts),
    /// Scaffold a starter package directory
    New(NewOpts),
    /// Print version information
    Version,
}

/// Options for the `link` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct LinkOpts {
    /// Path to the run configuration file
    #[arg(short, long)]
    pub config: PathBuf,

    /// Parameter override as key=value (repeatable)
    #[arg(short = 'p', long = "param")]
    pub params: Vec<String>,

    /// Directory that remote package sources are fetched into
    #[arg(short = 'w', long)]
    pub packages_dir: Option<PathBuf>,

    /// Derive __project__/__assets__/__plugins__ from a "project" parameter
    #[arg(long)]
    pub project_layout: bool,
}

/// Options for the `new` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct NewOpts {
    /// Location of the package directory to create
    pub location: PathBuf,
}
