//! Path resolution to [`CanonicalPath`].
//!
//! This module provides the `PathResolver` type, the single producer of
//! canonical paths used by the include-once registry and the subsystem
//! driver.

use std::path::Path;

use crate::error::{Error, Result};
use crate::path::types::CanonicalPath;
use crate::path::{canonicalize, normalize};

/// Resolves make words to canonical absolute paths.
///
/// By default resolution is lexical: relative paths are joined onto a base
/// directory and `.`/`..` are collapsed without touching the filesystem,
/// which is what `$(abspath)` does. A leading `~` is an ordinary path
/// component unless tilde expansion is enabled. With symlink following
/// enabled, the existing portion of the path is additionally canonicalized
/// on disk.
///
/// # Examples
///
/// ```
/// use mkinclude::path::PathResolver;
/// use std::path::Path;
///
/// let resolver = PathResolver::new();
/// let a = resolver.resolve("a/../b/c", Path::new("/root")).unwrap();
/// let b = resolver.resolve("b/c", Path::new("/root")).unwrap();
/// let c = resolver.resolve("/root/b/c", Path::new("/anything")).unwrap();
/// assert_eq!(a, b);
/// assert_eq!(b, c);
/// ```
#[derive(Debug, Clone)]
pub struct PathResolver {
    /// Whether to follow symlinks in the existing portion of a path.
    follow_symlinks: bool,
    /// Whether to expand a leading `~`.
    expand_tilde: bool,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            expand_tilde: false,
        }
    }
}

impl PathResolver {
    /// Create a new path resolver with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure whether symlinks are followed.
    ///
    /// # Examples
    ///
    /// ```
    /// use mkinclude::path::PathResolver;
    ///
    /// let resolver = PathResolver::new().with_symlink_following(true);
    /// assert!(resolver.follows_symlinks());
    /// ```
    #[must_use]
    pub fn with_symlink_following(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Configure whether a leading `~` is expanded to the home directory.
    #[must_use]
    pub fn with_tilde_expansion(mut self, expand: bool) -> Self {
        self.expand_tilde = expand;
        self
    }

    /// Whether this resolver follows symlinks.
    #[must_use]
    pub fn follows_symlinks(&self) -> bool {
        self.follow_symlinks
    }

    /// Whether `word` is absolute under this resolver's settings.
    ///
    /// A leading `~` only counts while tilde expansion is enabled.
    ///
    /// # Examples
    ///
    /// ```
    /// use mkinclude::path::PathResolver;
    ///
    /// assert!(!PathResolver::new().is_absolute("~/x.mk"));
    /// assert!(PathResolver::new().with_tilde_expansion(true).is_absolute("~/x.mk"));
    /// ```
    #[must_use]
    pub fn is_absolute(&self, word: &str) -> bool {
        if self.expand_tilde {
            is_absolute_word(word)
        } else {
            Path::new(word).is_absolute()
        }
    }

    /// Resolve `path` against `base`.
    ///
    /// Absolute paths ignore `base`. Relative paths are joined onto `base`,
    /// which must itself be absolute.
    ///
    /// # Errors
    ///
    /// Returns a resolution error if the path is empty, malformed, relative
    /// to a non-absolute base, not valid UTF-8 after resolution, or contains
    /// whitespace. With symlink following enabled, filesystem errors are
    /// reported as well.
    pub fn resolve(&self, path: &str, base: &Path) -> Result<CanonicalPath> {
        let normalized = normalize::normalize_against(path, base, self.expand_tilde)?;

        let resolved = if self.follow_symlinks {
            canonicalize::canonicalize_existing(&normalized)?
        } else {
            normalized
        };

        log::trace!("resolved '{path}' against {} to {}", base.display(), resolved.display());
        CanonicalPath::from_normalized(resolved, path)
    }

    /// Resolve a path that must already be absolute.
    ///
    /// # Errors
    ///
    /// Returns a resolution error if `path` is relative, or for any reason
    /// listed on [`PathResolver::resolve`].
    ///
    /// # Examples
    ///
    /// ```
    /// use mkinclude::path::PathResolver;
    ///
    /// let resolver = PathResolver::new();
    /// assert_eq!(resolver.resolve_absolute("/x/./y").unwrap().as_str(), "/x/y");
    /// assert!(resolver.resolve_absolute("x/y").is_err());
    /// ```
    pub fn resolve_absolute(&self, path: &str) -> Result<CanonicalPath> {
        if !self.is_absolute(path) {
            return Err(Error::Resolution {
                path: path.to_string(),
                reason: "expected an absolute path".to_string(),
            });
        }
        self.resolve(path, Path::new("/"))
    }
}

/// Whether a make word names an absolute path.
///
/// A leading `/` is what the make functions test for; a leading `~` is
/// absolute once expanded.
#[must_use]
pub fn is_absolute_word(word: &str) -> bool {
    word.starts_with('/') || word == "~" || word.starts_with("~/") || Path::new(word).is_absolute()
}
