#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # mkinclude
//!
//! Include guards and directory-relative includes for GNU make.
//!
//! This library implements four make functions against an injected host:
//!
//! - `$(include-once PATH...)` includes each file at most once per make run,
//!   however it is spelled.
//! - `$(include-once-debug PATH...)` does the same and reports every
//!   decision on stderr.
//! - `$(from-here LIST)` resolves words relative to the directory of the
//!   fragment currently being parsed.
//! - `$(include-subsystem FILE)` includes a fragment with its own directory
//!   as the current context, at most once per `past_includes` set.
//!
//! ## Core Types
//!
//! - [`Includer`]: the state object behind the four functions
//! - [`host::Evaluator`] and [`host::VariableStore`]: what the host provides
//! - [`PathResolver`] and [`CanonicalPath`]: path canonicalization
//! - [`IncludeOnceRegistry`]: the private include-once set
//! - [`context::ContextStack`]: the `here_stack` save/restore stack
//! - [`Error`] and [`Result`]: Error handling types
//! - [`Logger`] and [`LogLevel`]: Logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use mkinclude::PathResolver;
//! use std::path::Path;
//!
//! let resolver = PathResolver::new();
//! let a = resolver.resolve("a/../b/c", Path::new("/root")).unwrap();
//! let b = resolver.resolve("b/c", Path::new("/root")).unwrap();
//! assert_eq!(a, b);
//! assert_eq!(a.as_str(), "/root/b/c");
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod host;
pub mod includer;
pub mod logging;
pub mod path;
pub mod registry;
pub mod subsystem;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use includer::Includer;
pub use logging::{init_logger, LogLevel, Logger};
pub use path::{CanonicalPath, PathResolver};
pub use registry::IncludeOnceRegistry;
