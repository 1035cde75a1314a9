//! Path handling for make words.
//!
//! Every path that enters a dedup set or the context stack passes through
//! this module first.
//!
//! # Key Concepts
//!
//! ## Normalization
//!
//! Normalization converts a word to absolute form by:
//! - Expanding tilde (~) to the home directory (configurable)
//! - Joining relative words onto a base directory
//! - Resolving `.` and `..` components lexically
//!
//! ## Canonicalization
//!
//! Canonicalization follows symlinks to get the "real" path on the
//! filesystem. It is off by default so that results match `$(abspath)`.
//!
//! # Examples
//!
//! ```
//! use mkinclude::path::PathResolver;
//! use std::path::Path;
//!
//! let resolver = PathResolver::new();
//! let path = resolver.resolve("../sibling/sibling.mk", Path::new("/proj/sub")).unwrap();
//! assert_eq!(path.as_str(), "/proj/sibling/sibling.mk");
//! ```

pub mod canonicalize;
pub mod normalize;
pub mod resolver;
mod types;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

pub use resolver::{is_absolute_word, PathResolver};
pub use types::CanonicalPath;
