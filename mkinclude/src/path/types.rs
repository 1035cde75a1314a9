//! Core types for path handling.
//!
//! This module defines [`CanonicalPath`], the equality key shared by both
//! dedup sets and the value stored on the context stack.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// An absolute, normalized path that is also a single make word.
///
/// A `CanonicalPath` never contains `.` or `..` components, always starts at
/// the filesystem root and never contains whitespace, so it can be stored in
/// a space-separated make variable and compared byte-for-byte.
///
/// Values are only produced by [`PathResolver`](crate::path::PathResolver)
/// or derived from another `CanonicalPath` (see [`CanonicalPath::parent`]).
///
/// # Examples
///
/// ```
/// use mkinclude::path::PathResolver;
/// use std::path::Path;
///
/// let resolver = PathResolver::new();
/// let path = resolver.resolve("sub/./a.mk", Path::new("/proj")).unwrap();
/// assert_eq!(path.as_str(), "/proj/sub/a.mk");
/// assert_eq!(path.parent().as_str(), "/proj/sub");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalPath(String);

impl CanonicalPath {
    /// Wrap an already-normalized path, checking the invariants.
    ///
    /// `original` is only used for error reporting.
    pub(crate) fn from_normalized(path: PathBuf, original: &str) -> Result<Self> {
        if !path.is_absolute() {
            return Err(Error::InvalidPath {
                path,
                reason: "Path must be absolute after normalization".to_string(),
            });
        }

        let text = path.into_os_string().into_string().map_err(|os| Error::Resolution {
            path: original.to_string(),
            reason: format!("resolved path {} is not valid UTF-8", os.to_string_lossy()),
        })?;

        if text.chars().any(char::is_whitespace) {
            return Err(Error::Resolution {
                path: original.to_string(),
                reason: format!("resolved path '{text}' contains whitespace"),
            });
        }

        Ok(Self(text))
    }

    /// The path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The path as a [`Path`].
    #[must_use]
    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// The directory containing this path.
    ///
    /// The root is its own parent, mirroring `$(abspath $(dir /))`.
    #[must_use]
    pub fn parent(&self) -> Self {
        match self.as_path().parent() {
            Some(parent) => Self(parent.to_string_lossy().into_owned()),
            None => self.clone(),
        }
    }

    /// Convert into the underlying `String`.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<Path> for CanonicalPath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

impl AsRef<str> for CanonicalPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
