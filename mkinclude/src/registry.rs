//! The include-once registry.
//!
//! A private, process-lifetime set of canonical paths that have already been
//! handed to the host for inclusion. The build description cannot see or
//! reset it.

use std::cell::RefCell;
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::path::CanonicalPath;

/// Append-only set of paths already included through `include-once`.
///
/// The set uses interior mutability so that a nested `include-once`, running
/// while the host evaluates an outer inclusion, can record its own paths
/// through the same shared reference. Borrows never outlive a single method
/// call.
///
/// # Examples
///
/// ```
/// use mkinclude::path::PathResolver;
/// use mkinclude::IncludeOnceRegistry;
/// use std::path::Path;
///
/// let registry = IncludeOnceRegistry::new();
/// let path = PathResolver::new().resolve("sub/sub.mk", Path::new("/proj")).unwrap();
///
/// assert!(registry.record(&path).unwrap());
/// assert!(!registry.record(&path).unwrap());
/// assert!(registry.contains(&path));
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct IncludeOnceRegistry {
    included: RefCell<HashSet<CanonicalPath>>,
}

impl IncludeOnceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `path` was already recorded.
    #[must_use]
    pub fn contains(&self, path: &CanonicalPath) -> bool {
        self.included.borrow().contains(path)
    }

    /// Record `path`, returning `true` if it was not present before.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Allocation`] if the set cannot grow. The registry is
    /// unchanged in that case.
    pub fn record(&self, path: &CanonicalPath) -> Result<bool> {
        let mut included = self.included.borrow_mut();
        if included.contains(path) {
            return Ok(false);
        }

        included.try_reserve(1).map_err(|source| Error::Allocation {
            context: format!("recording {path}"),
            source,
        })?;
        included.insert(path.clone());
        log::debug!("include-once registry: {path} ({} entries)", included.len());
        Ok(true)
    }

    /// Number of recorded paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.included.borrow().len()
    }

    /// Whether nothing was recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.included.borrow().is_empty()
    }

    /// A sorted snapshot of the recorded paths.
    #[must_use]
    pub fn paths(&self) -> Vec<CanonicalPath> {
        let mut paths: Vec<_> = self.included.borrow().iter().cloned().collect();
        paths.sort();
        paths
    }
}
