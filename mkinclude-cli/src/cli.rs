//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{
    CompletionsCommand, FromHereCommand, ResolveCommand, ShowConfigCommand, TraceCommand,
    ValidateCommand,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Inspect how mkinclude resolves and deduplicates make includes.
#[derive(Parser)]
#[command(name = "mkinclude")]
#[command(
    version,
    about = "Inspect include-once and from-here resolution for GNU make",
    long_about = None
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Configuration file to load on top of the user configuration
    #[arg(long, value_name = "PATH", global = true, env = "MKINCLUDE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Print the canonical form of one or more paths
    Resolve(ResolveCommand),

    /// Evaluate `$(from-here LIST)` for a given context
    FromHere(FromHereCommand),

    /// Dry-run a build description and print its inclusion tree
    Trace(TraceCommand),

    /// Show the configuration in effect
    ShowConfig(ShowConfigCommand),

    /// Validate a configuration file
    Validate(ValidateCommand),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}
