//! Configuration system for mkinclude.
//!
//! Configuration decides which host variables hold the context, the context
//! stack and the subsystem set, how paths are canonicalized, and what
//! location accompanies evaluated statements.
//!
//! # Configuration Precedence
//!
//! Configuration is merged from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Programmatic overrides (via `ConfigBuilder::with_config`)
//! 2. Environment variables (`MKINCLUDE_*`)
//! 3. The file named by `ConfigBuilder::with_file` or `MKINCLUDE_CONFIG`
//! 4. User config (`~/.mkinclude/config.yaml`)
//! 5. Built-in defaults
//!
//! # Examples
//!
//! ```no_run
//! use mkinclude::config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new().build().unwrap();
//! println!("context variable: {}", config.variable_names().here);
//! ```

pub mod builder;
pub mod environment;
pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

pub use builder::ConfigBuilder;
pub use environment::EnvironmentConfig;
pub use loader::{ConfigLoader, ConfigSource, CONFIG_ENV};
pub use merger::ConfigMerger;
pub use schema::{Config, LocationMode, VariableConfig, VariableNames};
pub use validator::ConfigValidator;
