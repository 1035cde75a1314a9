//! Error types for the mkinclude library.
//!
//! This module provides the error hierarchy shared by the path resolver, the
//! include-once registry and the subsystem driver, using `thiserror` for
//! ergonomic error handling.

use std::collections::TryReserveError;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for operations that may fail with an mkinclude error.
///
/// # Examples
///
/// ```
/// use mkinclude::{Error, Result};
///
/// fn example_operation() -> Result<&'static str> {
///     Ok("sub/sub.mk")
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the mkinclude library.
#[derive(Debug, Error)]
pub enum Error {
    /// A path could not be resolved to canonical form.
    #[error("cannot resolve '{path}': {reason}")]
    Resolution {
        /// The path as it was written in the build description.
        path: String,
        /// The reason resolution failed.
        reason: String,
    },

    /// Growing a dedup set failed for lack of memory.
    #[error("allocation failed while {context}: {source}")]
    Allocation {
        /// What was being recorded when the allocation failed.
        context: String,
        /// The underlying reservation failure.
        #[source]
        source: TryReserveError,
    },

    /// The host reported a failure while evaluating a statement.
    #[error("host failed to evaluate '{statement}': {reason}")]
    HostEvaluation {
        /// The statement handed to the host.
        statement: String,
        /// The host's description of the failure.
        reason: String,
    },

    /// An invalid filesystem path was provided.
    #[error("invalid path {}: {reason}", path.display())]
    InvalidPath {
        /// The invalid path.
        path: PathBuf,
        /// The reason the path is invalid.
        reason: String,
    },

    /// A path does not exist.
    #[error("path not found: {}", path.display())]
    PathNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// Permission denied accessing a path.
    #[error("permission denied: {}", path.display())]
    PermissionDenied {
        /// The path that could not be accessed.
        path: PathBuf,
    },

    /// A symlink loop was detected.
    #[error("symlink loop detected: {}", path.display())]
    SymlinkLoop {
        /// The path where the loop was detected.
        path: PathBuf,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file could not be parsed.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// A validation error occurred.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },
}

impl Error {
    /// Check if error is a path resolution failure.
    ///
    /// Filesystem lookups performed while canonicalizing also count as
    /// resolution failures, since they abort the same inclusion attempt.
    ///
    /// # Examples
    ///
    /// ```
    /// use mkinclude::Error;
    ///
    /// let err = Error::Resolution { path: "".into(), reason: "empty path".into() };
    /// assert!(err.is_resolution());
    /// ```
    #[must_use]
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            Self::Resolution { .. }
                | Self::InvalidPath { .. }
                | Self::PathNotFound { .. }
                | Self::PermissionDenied { .. }
                | Self::SymlinkLoop { .. }
        )
    }

    /// Check if error came from the host evaluating a statement.
    #[must_use]
    pub fn is_host_evaluation(&self) -> bool {
        matches!(self, Self::HostEvaluation { .. })
    }

    /// Check if error indicates a path does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use mkinclude::Error;
    /// use std::path::PathBuf;
    ///
    /// let err = Error::PathNotFound { path: PathBuf::from("/nonexistent") };
    /// assert!(err.is_not_found());
    /// ```
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PathNotFound { .. })
    }
}
