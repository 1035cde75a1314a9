//! Main entry point for the mkinclude CLI.
//!
//! The CLI drives the same core as the make plugin, outside of make:
//! - `resolve`: Print canonical paths
//! - `from-here`: Resolve a word list against a context directory
//! - `trace`: Dry-run a build description and show what gets included
//! - `show-config`: Print the layered configuration
//! - `validate`: Check a configuration file

mod cli;
mod commands;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;
use utils::GlobalOptions;

fn main() {
    let cli = Cli::parse();

    let logger = mkinclude::init_logger(cli.verbose, cli.quiet);

    let global = GlobalOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config: cli.config,
        logger,
    };

    let result = match cli.command {
        cli::Command::Resolve(cmd) => cmd.execute(&global),
        cli::Command::FromHere(cmd) => cmd.execute(&global),
        cli::Command::Trace(cmd) => cmd.execute(&global),
        cli::Command::ShowConfig(cmd) => cmd.execute(&global),
        cli::Command::Validate(cmd) => cmd.execute(&global),
        cli::Command::Completions(cmd) => cmd.execute(&global),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
