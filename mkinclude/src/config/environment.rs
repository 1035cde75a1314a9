//! Environment variable handling for configuration overrides.
//!
//! `MKINCLUDE_*` variables override configuration file values.

use crate::config::schema::{Config, LocationMode};
use crate::error::{Error, Result};
use crate::logging::{LogLevel, LOG_MODE_ENV};
use std::env;

/// Handles environment variable overrides for configuration.
///
/// # Examples
///
/// ```no_run
/// use mkinclude::config::{Config, EnvironmentConfig};
///
/// let mut config = Config::default();
/// EnvironmentConfig::apply_overrides(&mut config).unwrap();
/// ```
pub struct EnvironmentConfig;

impl EnvironmentConfig {
    /// Apply environment variable overrides to config.
    ///
    /// # Errors
    ///
    /// Returns an error if any environment variable value is invalid
    /// (e.g., an unknown location mode or a malformed boolean).
    pub fn apply_overrides(config: &mut Config) -> Result<()> {
        if let Ok(val) = env::var(LOG_MODE_ENV) {
            config.log_mode = Some(LogLevel::parse(&val).map_err(|message| Error::Validation {
                field: LOG_MODE_ENV.into(),
                message,
            })?);
        }

        if let Ok(val) = env::var("MKINCLUDE_FOLLOW_SYMLINKS") {
            config.follow_symlinks = Some(Self::parse_bool("MKINCLUDE_FOLLOW_SYMLINKS", &val)?);
        }

        if let Ok(val) = env::var("MKINCLUDE_EXPAND_TILDE") {
            config.expand_tilde = Some(Self::parse_bool("MKINCLUDE_EXPAND_TILDE", &val)?);
        }

        if let Ok(val) = env::var("MKINCLUDE_LOCATION") {
            config.location =
                Some(LocationMode::parse(&val).ok_or_else(|| Error::Validation {
                    field: "MKINCLUDE_LOCATION".into(),
                    message: format!("Invalid location mode: '{val}' (expected placeholder/provenance)"),
                })?);
        }

        Self::apply_variable_overrides(config);

        Ok(())
    }

    /// Apply host variable name overrides.
    fn apply_variable_overrides(config: &mut Config) {
        let mut variables = config.variables.clone().unwrap_or_default();
        let mut modified = false;

        if let Ok(name) = env::var("MKINCLUDE_HERE_VAR") {
            variables.here = Some(name);
            modified = true;
        }

        if let Ok(name) = env::var("MKINCLUDE_HERE_STACK_VAR") {
            variables.here_stack = Some(name);
            modified = true;
        }

        if let Ok(name) = env::var("MKINCLUDE_PAST_INCLUDES_VAR") {
            variables.past_includes = Some(name);
            modified = true;
        }

        if modified {
            config.variables = Some(variables);
        }
    }

    /// Parse a boolean value from a string.
    ///
    /// Accepts: true/1/yes/on for true, false/0/no/off for false (case-insensitive).
    fn parse_bool(field: &str, s: &str) -> Result<bool> {
        match s.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(Error::Validation {
                field: field.into(),
                message: format!(
                    "Invalid boolean value: '{s}' (expected true/false/1/0/yes/no/on/off)"
                ),
            }),
        }
    }
}
