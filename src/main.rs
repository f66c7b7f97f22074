use anyhow::Result;
use clap::Parser;

use paklink::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    logging::init(args.verbose);

    match args.command {
        cli::Command::Link(opts) => commands::link::run(&opts),
        cli::Command::New(opts) => commands::new::run(&opts),
        cli::Command::Version => {
            println!("paklink {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
