//! Configuration file discovery and loading.
//!
//! Two files are consulted: the user configuration at
//! `~/.mkinclude/config.yaml` and an explicit file, named either
//! programmatically or through `MKINCLUDE_CONFIG`.

use crate::config::schema::Config;
use crate::error::{Error, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV: &str = "MKINCLUDE_CONFIG";

/// Configuration source with its precedence level.
///
/// Lower precedence values are overridden by higher ones.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Path to the configuration file.
    pub path: PathBuf,
    /// Precedence level (higher values take priority).
    pub precedence: u8,
    /// Parsed configuration.
    pub config: Config,
}

/// Loads configuration from files.
///
/// # Examples
///
/// ```no_run
/// use mkinclude::config::ConfigLoader;
///
/// let sources = ConfigLoader::load_all(None).unwrap();
/// println!("Found {} configuration sources", sources.len());
/// ```
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load every configuration file that applies, lowest precedence first.
    ///
    /// 1. `~/.mkinclude/config.yaml`, if it exists (precedence 1)
    /// 2. `explicit`, or else the file named by `MKINCLUDE_CONFIG`
    ///    (precedence 2)
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file does not exist, or if
    /// any file exists but cannot be read or parsed.
    pub fn load_all(explicit: Option<&Path>) -> Result<Vec<ConfigSource>> {
        let mut sources = Vec::new();

        if let Some(path) = Self::user_config_path() {
            if path.exists() {
                let config = Self::load_file(&path)?;
                sources.push(ConfigSource {
                    path,
                    precedence: 1,
                    config,
                });
            }
        }

        let explicit = explicit
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()).map(PathBuf::from));

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::PathNotFound { path });
            }
            let config = Self::load_file(&path)?;
            sources.push(ConfigSource {
                path,
                precedence: 2,
                config,
            });
        }

        sources.sort_by_key(|s| s.precedence);
        Ok(sources)
    }

    /// Load and parse a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the YAML is invalid.
    pub fn load_file(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path).map_err(|e| Error::InvalidPath {
            path: path.to_path_buf(),
            reason: format!("Failed to read configuration file: {e}"),
        })?;

        serde_yaml::from_str(&contents).map_err(|e| Error::Validation {
            field: format!("{}", path.display()),
            message: format!("Invalid YAML: {e}"),
        })
    }

    /// Path of the per-user configuration file.
    ///
    /// `None` when no home directory is known.
    #[must_use]
    pub fn user_config_path() -> Option<PathBuf> {
        home::home_dir().map(|home| home.join(".mkinclude").join("config.yaml"))
    }
}
