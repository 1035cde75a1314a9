//! Configuration validation.

use crate::config::schema::Config;
use crate::error::{Error, Result};
use std::collections::HashSet;

/// Characters that would change the meaning of `NAME:=value` or
/// `$(NAME)` when they appear in a variable name.
const FORBIDDEN_NAME_CHARS: &[char] = &['$', ':', '=', '#', '(', ')', '{', '}'];

/// Validates configuration values.
///
/// # Examples
///
/// ```
/// use mkinclude::config::{Config, ConfigValidator};
///
/// let config = Config::default();
/// ConfigValidator::validate(&config).unwrap();
/// ```
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending field.
    pub fn validate(config: &Config) -> Result<()> {
        let names = config.variable_names();
        let fields = [
            ("variables.here", names.here.as_str()),
            ("variables.here_stack", names.here_stack.as_str()),
            ("variables.past_includes", names.past_includes.as_str()),
        ];

        for (field, name) in fields {
            Self::validate_variable_name(field, name)?;
        }

        let mut seen = HashSet::new();
        for (field, name) in fields {
            if !seen.insert(name) {
                return Err(Error::Validation {
                    field: field.into(),
                    message: format!("variable name '{name}' is used more than once"),
                });
            }
        }

        Ok(())
    }

    /// Validate a single host variable name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or contains whitespace or make
    /// metacharacters.
    pub fn validate_variable_name(field: &str, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::Validation {
                field: field.into(),
                message: "variable name cannot be empty".into(),
            });
        }

        if name.chars().any(char::is_whitespace) {
            return Err(Error::Validation {
                field: field.into(),
                message: format!("variable name '{name}' contains whitespace"),
            });
        }

        if let Some(c) = name.chars().find(|c| FORBIDDEN_NAME_CHARS.contains(c)) {
            return Err(Error::Validation {
                field: field.into(),
                message: format!("variable name '{name}' contains '{c}'"),
            });
        }

        Ok(())
    }
}
