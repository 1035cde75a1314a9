//! Configuration schema definitions.
//!
//! Every field is optional so that partial configurations from different
//! sources can be layered; the accessors on [`Config`] apply the built-in
//! defaults.

use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;

/// Default name of the host variable holding the current context.
pub const DEFAULT_HERE_VAR: &str = "here";

/// Default name of the host variable holding the saved contexts.
pub const DEFAULT_HERE_STACK_VAR: &str = "here_stack";

/// Default name of the host variable holding the subsystem dedup set.
pub const DEFAULT_PAST_INCLUDES_VAR: &str = "past_includes";

/// Complete configuration structure.
///
/// # Examples
///
/// ```
/// use mkinclude::config::{Config, LocationMode};
///
/// let config = Config {
///     follow_symlinks: Some(true),
///     location: Some(LocationMode::Placeholder),
///     ..Default::default()
/// };
/// assert!(config.follow_symlinks());
/// assert!(!config.expand_tilde());
/// assert_eq!(config.variable_names().here, "here");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Names of the host variables the include functions read and write.
    pub variables: Option<VariableConfig>,

    /// Which location accompanies statements handed to the host.
    pub location: Option<LocationMode>,

    /// Canonicalize through symbolic links when the target exists.
    pub follow_symlinks: Option<bool>,

    /// Expand `~` and `~/...` the way make's `include` does, instead of
    /// treating `~` as a directory name the way `$(abspath)` does.
    pub expand_tilde: Option<bool>,

    /// Diagnostic verbosity.
    pub log_mode: Option<LogLevel>,
}

/// Host variable names as they appear in a configuration file.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct VariableConfig {
    /// Current context variable.
    pub here: Option<String>,
    /// Saved contexts variable.
    pub here_stack: Option<String>,
    /// Subsystem dedup set variable.
    pub past_includes: Option<String>,
}

/// Resolved host variable names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableNames {
    /// Current context variable.
    pub here: String,
    /// Saved contexts variable.
    pub here_stack: String,
    /// Subsystem dedup set variable.
    pub past_includes: String,
}

impl Default for VariableNames {
    fn default() -> Self {
        Self {
            here: DEFAULT_HERE_VAR.to_string(),
            here_stack: DEFAULT_HERE_STACK_VAR.to_string(),
            past_includes: DEFAULT_PAST_INCLUDES_VAR.to_string(),
        }
    }
}

/// Location attached to every statement evaluated on behalf of the build
/// description.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LocationMode {
    /// A fixed `<mkinclude>:0` location.
    Placeholder,
    /// The file currently being parsed, taken from `MAKEFILE_LIST`.
    #[default]
    Provenance,
}

impl LocationMode {
    /// Parse a mode name as used in environment variables.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "placeholder" => Some(Self::Placeholder),
            "provenance" => Some(Self::Provenance),
            _ => None,
        }
    }
}

impl Config {
    /// Host variable names with defaults applied.
    #[must_use]
    pub fn variable_names(&self) -> VariableNames {
        let defaults = VariableNames::default();
        let Some(vars) = &self.variables else {
            return defaults;
        };

        VariableNames {
            here: vars.here.clone().unwrap_or(defaults.here),
            here_stack: vars.here_stack.clone().unwrap_or(defaults.here_stack),
            past_includes: vars.past_includes.clone().unwrap_or(defaults.past_includes),
        }
    }

    /// Location mode, provenance by default.
    #[must_use]
    pub fn location_mode(&self) -> LocationMode {
        self.location.unwrap_or_default()
    }

    /// Whether symbolic links are followed, off by default.
    #[must_use]
    pub fn follow_symlinks(&self) -> bool {
        self.follow_symlinks.unwrap_or(false)
    }

    /// Whether tilde expansion is enabled, off by default.
    #[must_use]
    pub fn expand_tilde(&self) -> bool {
        self.expand_tilde.unwrap_or(false)
    }

    /// Log level, normal by default.
    #[must_use]
    pub fn log_level(&self) -> LogLevel {
        self.log_mode.unwrap_or_default()
    }
}
