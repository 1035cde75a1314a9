//! CLI command implementations.
//!
//! This module contains the implementations of all CLI commands:
//! - `resolve`: Print the canonical form of paths
//! - `from_here`: Evaluate `$(from-here LIST)` outside of make
//! - `trace`: Dry-run a build description through the include functions
//! - `show_config`: Show the configuration in effect
//! - `validate`: Validate a configuration file
//! - `completions`: Generate shell completion scripts

pub mod completions;
pub mod from_here;
pub mod resolve;
pub mod show_config;
pub mod trace;
pub mod validate;

pub use completions::CompletionsCommand;
pub use from_here::FromHereCommand;
pub use resolve::ResolveCommand;
pub use show_config::ShowConfigCommand;
pub use trace::TraceCommand;
pub use validate::ValidateCommand;
