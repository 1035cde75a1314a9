//! Configuration merging and precedence handling.

use crate::config::loader::ConfigSource;
use crate::config::schema::{Config, VariableConfig};

/// Merges configuration sources according to precedence rules.
///
/// # Examples
///
/// ```
/// use mkinclude::config::{Config, ConfigMerger};
///
/// let low = Config { follow_symlinks: Some(false), ..Default::default() };
/// let high = Config { follow_symlinks: Some(true), ..Default::default() };
///
/// let mut result = low;
/// ConfigMerger::merge_into(&mut result, &high);
/// assert_eq!(result.follow_symlinks, Some(true));
/// ```
pub struct ConfigMerger;

impl ConfigMerger {
    /// Merge multiple configuration sources into final config.
    ///
    /// Sources should be provided in order from lowest to highest precedence.
    #[must_use]
    pub fn merge(sources: Vec<ConfigSource>) -> Config {
        let mut result = Config::default();

        for source in sources {
            Self::merge_into(&mut result, &source.config);
        }

        result
    }

    /// Merge source config into target (source overwrites target).
    ///
    /// Simple fields are overwritten when set in `source`; variable names
    /// are merged name by name.
    pub fn merge_into(target: &mut Config, source: &Config) {
        if source.location.is_some() {
            target.location = source.location;
        }

        if source.follow_symlinks.is_some() {
            target.follow_symlinks = source.follow_symlinks;
        }

        if source.expand_tilde.is_some() {
            target.expand_tilde = source.expand_tilde;
        }

        if source.log_mode.is_some() {
            target.log_mode = source.log_mode;
        }

        if let Some(ref source_vars) = source.variables {
            target.variables = Some(match &target.variables {
                Some(target_vars) => Self::merge_variables(target_vars, source_vars),
                None => source_vars.clone(),
            });
        }
    }

    fn merge_variables(target: &VariableConfig, source: &VariableConfig) -> VariableConfig {
        VariableConfig {
            here: source.here.clone().or_else(|| target.here.clone()),
            here_stack: source.here_stack.clone().or_else(|| target.here_stack.clone()),
            past_includes: source
                .past_includes
                .clone()
                .or_else(|| target.past_includes.clone()),
        }
    }
}
