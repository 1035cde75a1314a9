//! Diagnostics written to stderr.
//!
//! GNU make passes a loaded object's stderr straight through, so every
//! message here lands between make's own diagnostics. Lines carry an upper
//! case tag (`ERROR:`, `WARN:`, `INFO:`, `DEBUG:`) and nothing else; the
//! `*-debug` make functions rely on the `DEBUG:` lines being printed no
//! matter how the rest of the run is configured.

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Environment variable consulted by [`init_logger`].
pub const LOG_MODE_ENV: &str = "MKINCLUDE_LOG_MODE";

/// How much the include functions say.
///
/// Levels compare by verbosity, `Quiet` being the least verbose.
///
/// # Examples
///
/// ```
/// use mkinclude::LogLevel;
///
/// assert!(LogLevel::Quiet < LogLevel::Normal);
/// assert!(LogLevel::Normal < LogLevel::Verbose);
/// assert_eq!("verbose".parse::<LogLevel>().unwrap(), LogLevel::Verbose);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Nothing at all.
    Quiet,
    /// Errors and warnings, such as words that cannot be resolved.
    #[default]
    Normal,
    /// Every inclusion decision as well.
    Verbose,
}

impl LogLevel {
    /// The name used in configuration files and `MKINCLUDE_LOG_MODE`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quiet => "quiet",
            Self::Normal => "normal",
            Self::Verbose => "verbose",
        }
    }

    /// Parse a level name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if `s` names no level.
    ///
    /// # Examples
    ///
    /// ```
    /// use mkinclude::LogLevel;
    ///
    /// assert_eq!(LogLevel::parse("QUIET").unwrap(), LogLevel::Quiet);
    /// assert!(LogLevel::parse("loud").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, String> {
        [Self::Quiet, Self::Normal, Self::Verbose]
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("invalid log level '{s}' (expected quiet, normal or verbose)"))
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writes tagged lines to stderr when its level allows.
///
/// # Examples
///
/// ```
/// use mkinclude::{Logger, LogLevel};
///
/// let logger = Logger::new(LogLevel::Normal);
/// logger.warn("cannot resolve 'bad word.mk'");
/// logger.debug("dropped: needs LogLevel::Verbose");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Logger {
    level: LogLevel,
}

impl Logger {
    /// A logger printing messages up to `level`.
    #[must_use]
    pub const fn new(level: LogLevel) -> Self {
        Self { level }
    }

    /// The configured level.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }

    /// Whether a message needing `level` would be printed.
    #[must_use]
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.level != LogLevel::Quiet && self.level >= level
    }

    /// `self`, or a fully verbose logger when `debug` is set.
    ///
    /// # Examples
    ///
    /// ```
    /// use mkinclude::{Logger, LogLevel};
    ///
    /// let quiet = Logger::new(LogLevel::Quiet);
    /// assert_eq!(quiet.escalated(true).level(), LogLevel::Verbose);
    /// assert_eq!(quiet.escalated(false).level(), LogLevel::Quiet);
    /// ```
    #[must_use]
    pub const fn escalated(self, debug: bool) -> Self {
        if debug {
            Self::new(LogLevel::Verbose)
        } else {
            self
        }
    }

    fn emit(&self, needs: LogLevel, tag: &str, message: &str) {
        if self.enabled(needs) {
            eprintln!("{tag}: {message}");
        }
    }

    /// `ERROR:` line, printed unless quiet.
    pub fn error(&self, message: &str) {
        self.emit(LogLevel::Normal, "ERROR", message);
    }

    /// `WARN:` line, printed unless quiet.
    pub fn warn(&self, message: &str) {
        self.emit(LogLevel::Normal, "WARN", message);
    }

    /// `INFO:` line, verbose only.
    pub fn info(&self, message: &str) {
        self.emit(LogLevel::Verbose, "INFO", message);
    }

    /// `DEBUG:` line, verbose only.
    ///
    /// ```
    /// use mkinclude::{Logger, LogLevel};
    ///
    /// Logger::new(LogLevel::Verbose).debug("Really including: \"sub/sub.mk\"");
    /// ```
    pub fn debug(&self, message: &str) {
        self.emit(LogLevel::Verbose, "DEBUG", message);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LogLevel::Normal)
    }
}

/// The logger for a command line run.
///
/// `--verbose` wins over `--quiet`; with neither flag the level comes from
/// `MKINCLUDE_LOG_MODE`, and an unset or unreadable value means
/// [`LogLevel::Normal`].
///
/// # Examples
///
/// ```
/// use mkinclude::{init_logger, LogLevel};
///
/// assert_eq!(init_logger(true, true).level(), LogLevel::Verbose);
/// ```
#[must_use]
pub fn init_logger(verbose: bool, quiet: bool) -> Logger {
    let level = match (verbose, quiet) {
        (true, _) => LogLevel::Verbose,
        (false, true) => LogLevel::Quiet,
        (false, false) => env::var(LOG_MODE_ENV)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default(),
    };
    Logger::new(level)
}
