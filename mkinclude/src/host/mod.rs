//! Capabilities the core borrows from the build-description processor.
//!
//! The core never talks to GNU make directly. It is handed a value that can
//! expand text, evaluate statements and read or write host variables, and
//! every side effect goes through that value. Production code wraps the
//! make C API; tests use recording fakes.
//!
//! - [`Evaluator`]: text expansion and statement evaluation.
//! - [`VariableStore`]: named variables in the host's namespace.
//! - [`Host`]: both of the above, blanket-implemented.
//! - [`MakeVariables`]: a `VariableStore` built on any `Evaluator` using make
//!   syntax (`$(origin NAME)`, `NAME:=value`).
//! - [`MemoryVariables`]: an in-process `VariableStore`.

mod make;
mod memory;

use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::error::{Error, Result};

pub use make::{escape_value, MakeVariables};
pub use memory::MemoryVariables;

/// Name of the make variable listing the files parsed so far.
pub const MAKEFILE_LIST: &str = "MAKEFILE_LIST";

/// Tag used when the originating file of a statement is not tracked.
pub const PLACEHOLDER_FILE: &str = "<mkinclude>";

/// A diagnostic location handed to the host with every evaluated statement.
///
/// Make prints it in front of any error raised while evaluating the
/// statement, e.g. `sub/sub.mk:0: missing separator`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    file: String,
    line: u64,
}

impl Location {
    /// Create a location for `file` at `line`.
    #[must_use]
    pub fn new(file: impl Into<String>, line: u64) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// The placeholder location used when provenance is not tracked.
    ///
    /// # Examples
    ///
    /// ```
    /// use mkinclude::host::Location;
    ///
    /// let loc = Location::placeholder();
    /// assert_eq!(loc.to_string(), "<mkinclude>:0");
    /// ```
    #[must_use]
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_FILE, 0)
    }

    /// The file part of the location.
    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    /// The line part of the location. Zero when unknown.
    #[must_use]
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Whether this is the placeholder location.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.file == PLACEHOLDER_FILE
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::placeholder()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Text expansion and statement evaluation provided by the host.
///
/// Implementations may re-enter the [`Includer`](crate::Includer) from inside
/// [`Evaluator::evaluate`]: evaluating `include x.mk` parses `x.mk`, which
/// may call the include functions again before the outer call returns.
#[cfg_attr(test, mockall::automock)]
pub trait Evaluator {
    /// Expand `text` the way the host expands a variable reference.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HostEvaluation`] if the host cannot expand the text.
    fn expand(&mut self, text: &str) -> Result<String>;

    /// Evaluate `statement` as if it were part of the build description.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HostEvaluation`] if the host reports a failure.
    fn evaluate(&mut self, statement: &str, location: &Location) -> Result<()>;

    /// The host's global notion of the current directory.
    ///
    /// # Errors
    ///
    /// Returns a resolution error if the directory cannot be determined.
    fn working_dir(&mut self) -> Result<PathBuf> {
        env::current_dir().map_err(|e| Error::Resolution {
            path: ".".to_string(),
            reason: format!("cannot get current directory: {e}"),
        })
    }
}

/// Named variables in the host's namespace.
pub trait VariableStore {
    /// Read a variable. `None` means the variable is undefined, which is
    /// different from defined-but-empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot be queried.
    fn variable(&mut self, name: &str) -> Result<Option<String>>;

    /// Define or overwrite a variable with a literal value.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects the assignment.
    fn set_variable(&mut self, name: &str, value: &str) -> Result<()>;

    /// Read a variable as a list of whitespace-separated words.
    ///
    /// An undefined variable is an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot be queried.
    fn words(&mut self, name: &str) -> Result<Vec<String>> {
        Ok(self
            .variable(name)?
            .map(|value| value.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default())
    }
}

/// Everything the include functions need from the host.
pub trait Host: Evaluator + VariableStore {}

impl<T: Evaluator + VariableStore + ?Sized> Host for T {}
