//! Symlink-aware canonicalization.
//!
//! Only consulted when the resolver follows symlinks. Lexical resolution,
//! the default, never touches the filesystem.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// `ELOOP` on the platforms that report it.
#[cfg(any(target_os = "linux", target_os = "android"))]
const ELOOP: Option<i32> = Some(40);
#[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd", target_os = "openbsd"))]
const ELOOP: Option<i32> = Some(62);
#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd"
)))]
const ELOOP: Option<i32> = None;

fn classify(path: &Path, e: io::Error) -> Error {
    let path = path.to_path_buf();
    match e.kind() {
        ErrorKind::NotFound => Error::PathNotFound { path },
        ErrorKind::PermissionDenied => Error::PermissionDenied { path },
        _ if ELOOP.is_some() && e.raw_os_error() == ELOOP => Error::SymlinkLoop { path },
        _ => Error::Io(e),
    }
}

/// Resolve every symlink in `path`, which must exist.
///
/// # Errors
///
/// `PathNotFound`, `PermissionDenied` or `SymlinkLoop` as the filesystem
/// reports them, or the underlying I/O error.
///
/// # Examples
///
/// ```no_run
/// use mkinclude::path::canonicalize::canonicalize;
/// use std::path::Path;
///
/// assert!(canonicalize(Path::new("/tmp")).unwrap().is_absolute());
/// ```
pub fn canonicalize(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).map_err(|e| classify(path, e))
}

/// Resolve symlinks in the part of `path` that exists and keep the rest.
///
/// A fragment generated later in the build gets the same key before and
/// after it is written, as long as its directory does not move.
///
/// # Errors
///
/// As for [`canonicalize`] on the deepest existing ancestor, or
/// `InvalidPath` if not even the root exists.
///
/// # Examples
///
/// ```no_run
/// use mkinclude::path::canonicalize::canonicalize_existing;
/// use std::path::Path;
///
/// let key = canonicalize_existing(Path::new("/tmp/not-yet-generated.mk")).unwrap();
/// assert!(key.ends_with("not-yet-generated.mk"));
/// ```
pub fn canonicalize_existing(path: &Path) -> Result<PathBuf> {
    let anchor = path
        .ancestors()
        .find(|ancestor| !ancestor.as_os_str().is_empty() && ancestor.exists())
        .ok_or_else(|| Error::InvalidPath {
            path: path.to_path_buf(),
            reason: "no part of the path exists".to_string(),
        })?;

    let mut resolved = canonicalize(anchor)?;
    match path.strip_prefix(anchor) {
        Ok(missing) if !missing.as_os_str().is_empty() => resolved.push(missing),
        _ => {}
    }
    Ok(resolved)
}
