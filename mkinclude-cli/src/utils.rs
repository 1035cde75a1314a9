//! Utility functions for CLI operations.
//!
//! This module provides helpers shared by the commands: configuration
//! loading, includer construction and working-directory handling.

use crate::error::CliError;
use mkinclude::{Config, ConfigBuilder, Includer, LogLevel, Logger};
use std::env;
use std::path::{Path, PathBuf};

/// Global CLI options shared across all commands.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Configuration file given on the command line or in `MKINCLUDE_CONFIG`.
    pub config: Option<PathBuf>,

    /// Logger initialized from the flags and `MKINCLUDE_LOG_MODE`.
    pub logger: Logger,
}

impl GlobalOptions {
    /// The log level requested by `--verbose`/`--quiet`, if any.
    pub fn requested_level(&self) -> Option<LogLevel> {
        if self.verbose {
            Some(LogLevel::Verbose)
        } else if self.quiet {
            Some(LogLevel::Quiet)
        } else {
            None
        }
    }
}

/// Load hierarchical configuration.
///
/// Configuration is merged from multiple sources with precedence:
/// 1. Global options (highest priority)
/// 2. Environment variables
/// 3. Configuration files
/// 4. Built-in defaults (lowest priority)
pub fn load_configuration(global: &GlobalOptions) -> Result<Config, CliError> {
    let mut builder = ConfigBuilder::new();

    if let Some(path) = &global.config {
        builder = builder.with_file(path);
    }

    if let Some(level) = global.requested_level() {
        builder = builder.with_config(Config {
            log_mode: Some(level),
            ..Default::default()
        });
    }

    builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))
}

/// Build an includer from the layered configuration.
pub fn build_includer(global: &GlobalOptions) -> Result<Includer, CliError> {
    Ok(Includer::new(load_configuration(global)?))
}

/// Resolve a directory option, using CWD if not specified.
///
/// Relative directories are taken relative to the current directory; the
/// result is not required to exist.
pub fn resolve_dir(dir: Option<&Path>) -> Result<PathBuf, CliError> {
    let cwd = env::current_dir()?;
    Ok(match dir {
        Some(d) if d.is_absolute() => d.to_path_buf(),
        Some(d) => cwd.join(d),
        None => cwd,
    })
}

/// Interpret a path argument as UTF-8, the only form make words take.
pub fn path_word(path: &Path) -> Result<&str, CliError> {
    path.to_str().ok_or_else(|| {
        CliError::InvalidArguments(format!("path is not valid UTF-8: {}", path.display()))
    })
}
