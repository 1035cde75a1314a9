//! In-process variable storage.

use std::collections::HashMap;

use crate::error::Result;
use crate::host::VariableStore;

/// A `VariableStore` backed by a `HashMap`.
///
/// Used by the dry-run tracer and by tests that do not need a real make.
///
/// # Examples
///
/// ```
/// use mkinclude::host::{MemoryVariables, VariableStore};
///
/// let mut vars = MemoryVariables::new();
/// assert_eq!(vars.variable("here").unwrap(), None);
/// vars.set_variable("here", "/proj").unwrap();
/// assert_eq!(vars.variable("here").unwrap().as_deref(), Some("/proj"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryVariables {
    values: HashMap<String, String>,
}

impl MemoryVariables {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a variable without going through the trait.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Append a word to a variable, the way make's `+=` does.
    pub fn append_word(&mut self, name: &str, word: &str) {
        let entry = self.values.entry(name.to_string()).or_default();
        if !entry.is_empty() {
            entry.push(' ');
        }
        entry.push_str(word);
    }

    /// Remove a variable, making it undefined again.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.values.remove(name)
    }
}

impl VariableStore for MemoryVariables {
    fn variable(&mut self, name: &str) -> Result<Option<String>> {
        Ok(self.values.get(name).cloned())
    }

    fn set_variable(&mut self, name: &str, value: &str) -> Result<()> {
        self.values.insert(name.to_string(), value.to_string());
        Ok(())
    }
}
