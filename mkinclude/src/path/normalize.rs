//! Path normalization functions.
//!
//! This module provides functionality to normalize paths by:
//! - Expanding tilde (~) to the home directory
//! - Joining relative paths onto a base directory
//! - Resolving `.` and `..` components lexically, the way `$(abspath)` does

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Expand tilde (~) to the home directory.
///
/// This function handles `~` and `~/path` but does not support `~user` syntax.
///
/// # Errors
///
/// Returns an error if:
/// - The home directory cannot be determined
/// - The path uses `~user` syntax (not supported)
///
/// # Examples
///
/// ```
/// use mkinclude::path::normalize::expand_tilde;
///
/// // Expands ~/path to home/path
/// let expanded = expand_tilde("~/project.mk").unwrap();
/// assert!(expanded.is_absolute());
/// assert!(expanded.ends_with("project.mk"));
///
/// // Leaves other paths unchanged
/// let expanded = expand_tilde("sub/a.mk").unwrap();
/// assert_eq!(expanded, std::path::Path::new("sub/a.mk"));
/// ```
pub fn expand_tilde(path: &str) -> Result<PathBuf> {
    if !path.starts_with('~') {
        return Ok(PathBuf::from(path));
    }

    let home = home::home_dir().ok_or_else(|| Error::Resolution {
        path: path.to_string(),
        reason: "cannot determine home directory".to_string(),
    })?;

    if path == "~" {
        Ok(home)
    } else if let Some(rest) = path.strip_prefix("~/") {
        Ok(home.join(rest))
    } else {
        Err(Error::Resolution {
            path: path.to_string(),
            reason: "~user syntax is not supported; use ~ or ~/path".to_string(),
        })
    }
}

/// Resolve `.` and `..` components in an absolute path.
///
/// A `..` at the root stays at the root, as GNU make's `$(abspath /..)` does.
///
/// # Examples
///
/// ```
/// use mkinclude::path::normalize::resolve_components;
/// use std::path::{Path, PathBuf};
///
/// let resolved = resolve_components(Path::new("/a/./b/../c"));
/// assert_eq!(resolved, PathBuf::from("/a/c"));
///
/// let resolved = resolve_components(Path::new("/a/../../c"));
/// assert_eq!(resolved, PathBuf::from("/c"));
/// ```
#[must_use]
pub fn resolve_components(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    let mut has_root = false;

    for component in path.components() {
        match component {
            Component::RootDir => {
                result.push(component);
                has_root = true;
            }
            Component::Prefix(prefix) => {
                result.push(prefix.as_os_str());
                has_root = true;
            }
            Component::Normal(c) => {
                result.push(c);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                // Popping the root is a no-op, which is the clamping we want.
                result.pop();
            }
        }
    }

    if has_root && result.as_os_str().is_empty() {
        result.push(Component::RootDir);
    }

    result
}

/// Normalize `path` to absolute form, resolving it against `base` when it is
/// relative.
///
/// # Errors
///
/// Returns an error if:
/// - `path` is empty or contains a NUL byte
/// - Tilde expansion fails
/// - `path` is relative and `base` is not absolute
///
/// # Examples
///
/// ```
/// use mkinclude::path::normalize::normalize_against;
/// use std::path::{Path, PathBuf};
///
/// let normalized = normalize_against("a/../b/c", Path::new("/root"), false).unwrap();
/// assert_eq!(normalized, PathBuf::from("/root/b/c"));
///
/// let normalized = normalize_against("/root/b/c", Path::new("/elsewhere"), false).unwrap();
/// assert_eq!(normalized, PathBuf::from("/root/b/c"));
/// ```
pub fn normalize_against(path: &str, base: &Path, tilde: bool) -> Result<PathBuf> {
    if path.is_empty() {
        return Err(Error::Resolution {
            path: String::new(),
            reason: "empty path".to_string(),
        });
    }
    if path.contains('\0') {
        return Err(Error::Resolution {
            path: path.escape_default().to_string(),
            reason: "path contains a NUL byte".to_string(),
        });
    }

    let expanded = if tilde {
        expand_tilde(path)?
    } else {
        PathBuf::from(path)
    };

    let absolute = if expanded.is_absolute() {
        expanded
    } else if base.is_absolute() {
        base.join(expanded)
    } else {
        return Err(Error::Resolution {
            path: path.to_string(),
            reason: format!("base directory {} is not absolute", base.display()),
        });
    };

    Ok(resolve_components(&absolute))
}
