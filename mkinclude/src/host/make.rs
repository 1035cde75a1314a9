//! Variable storage expressed in make syntax.
//!
//! GNU make's loadable-object API offers only `gmk_expand` and `gmk_eval`,
//! so variables are read with `$(origin NAME)` / `$(NAME)` and written with
//! a simply-expanded assignment.

use std::path::PathBuf;

use crate::error::Result;
use crate::host::{Evaluator, Location, VariableStore};

/// Escape a literal value so that `NAME:=value` stores it unchanged.
///
/// `$` would start a variable reference and `#` a comment.
///
/// # Examples
///
/// ```
/// use mkinclude::host::escape_value;
///
/// assert_eq!(escape_value("/a/$x#1"), "/a/$$x\\#1");
/// ```
#[must_use]
pub fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '$' => escaped.push_str("$$"),
            '#' => escaped.push_str("\\#"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// A [`VariableStore`] layered over an [`Evaluator`].
///
/// `MakeVariables` also forwards [`Evaluator`], so wrapping a raw make
/// evaluator yields a complete [`Host`](crate::host::Host).
#[derive(Debug)]
pub struct MakeVariables<E> {
    inner: E,
}

impl<E: Evaluator> MakeVariables<E> {
    /// Wrap an evaluator.
    pub fn new(inner: E) -> Self {
        Self { inner }
    }

    /// Borrow the wrapped evaluator.
    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Unwrap the evaluator.
    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E: Evaluator> Evaluator for MakeVariables<E> {
    fn expand(&mut self, text: &str) -> Result<String> {
        self.inner.expand(text)
    }

    fn evaluate(&mut self, statement: &str, location: &Location) -> Result<()> {
        self.inner.evaluate(statement, location)
    }

    fn working_dir(&mut self) -> Result<PathBuf> {
        self.inner.working_dir()
    }
}

impl<E: Evaluator> VariableStore for MakeVariables<E> {
    fn variable(&mut self, name: &str) -> Result<Option<String>> {
        let origin = self.inner.expand(&format!("$(origin {name})"))?;
        if origin.trim() == "undefined" {
            return Ok(None);
        }
        self.inner.expand(&format!("$({name})")).map(Some)
    }

    fn set_variable(&mut self, name: &str, value: &str) -> Result<()> {
        log::trace!("{name} := {value}");
        self.inner
            .evaluate(&format!("{name}:={}", escape_value(value)), &Location::placeholder())
    }
}
