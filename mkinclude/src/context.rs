//! The "here" context and its save/restore stack.
//!
//! The current context lives in the host variable `here`; saved contexts
//! live in `here_stack`. Both belong to the build description, so they are
//! read and written through a [`VariableStore`] on every call and never
//! cached.

use std::path::PathBuf;

use crate::config::VariableNames;
use crate::error::{Error, Result};
use crate::host::{Host, VariableStore, MAKEFILE_LIST};
use crate::path::{CanonicalPath, PathResolver};

/// LIFO stack of directories stored as words of a host variable.
///
/// The stack grows to the right: the last word is the top.
///
/// # Examples
///
/// ```
/// use mkinclude::context::ContextStack;
/// use mkinclude::host::MemoryVariables;
///
/// let mut vars = MemoryVariables::new();
/// let stack = ContextStack::new("here_stack");
/// stack.push(&mut vars, "/proj").unwrap();
/// stack.push(&mut vars, "/proj/sub").unwrap();
/// assert_eq!(stack.top(&mut vars).unwrap().as_deref(), Some("/proj/sub"));
/// assert_eq!(stack.pop(&mut vars).unwrap().as_deref(), Some("/proj/sub"));
/// assert_eq!(stack.pop(&mut vars).unwrap().as_deref(), Some("/proj"));
/// assert_eq!(stack.pop(&mut vars).unwrap(), None);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ContextStack<'a> {
    variable: &'a str,
}

impl<'a> ContextStack<'a> {
    /// A stack stored in the host variable `variable`.
    #[must_use]
    pub fn new(variable: &'a str) -> Self {
        Self { variable }
    }

    /// Push `dir` on top of the stack.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` is empty or contains whitespace, or if the
    /// host rejects the update.
    pub fn push<V: VariableStore + ?Sized>(&self, vars: &mut V, dir: &str) -> Result<()> {
        if dir.is_empty() || dir.chars().any(char::is_whitespace) {
            return Err(Error::InvalidPath {
                path: PathBuf::from(dir),
                reason: "context directories must be a single non-empty word".to_string(),
            });
        }

        let mut entries = vars.words(self.variable)?;
        entries.push(dir.to_string());
        log::debug!("push {dir} (depth {})", entries.len());
        vars.set_variable(self.variable, &entries.join(" "))
    }

    /// Remove and return the top of the stack, or `None` when it is empty.
    ///
    /// Only the last entry is removed, even if the same directory appears
    /// further down.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot be queried or updated.
    pub fn pop<V: VariableStore + ?Sized>(&self, vars: &mut V) -> Result<Option<String>> {
        let mut entries = vars.words(self.variable)?;
        let Some(top) = entries.pop() else {
            return Ok(None);
        };
        log::debug!("pop {top} (depth {})", entries.len());
        vars.set_variable(self.variable, &entries.join(" "))?;
        Ok(Some(top))
    }

    /// The top of the stack without removing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot be queried.
    pub fn top<V: VariableStore + ?Sized>(&self, vars: &mut V) -> Result<Option<String>> {
        Ok(vars.words(self.variable)?.pop())
    }

    /// Number of saved contexts.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot be queried.
    pub fn depth<V: VariableStore + ?Sized>(&self, vars: &mut V) -> Result<usize> {
        Ok(vars.words(self.variable)?.len())
    }
}

/// Access to the current context and its stack.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    names: &'a VariableNames,
    resolver: &'a PathResolver,
}

impl<'a> Context<'a> {
    /// Context tracking through the given variable names.
    #[must_use]
    pub fn new(names: &'a VariableNames, resolver: &'a PathResolver) -> Self {
        Self { names, resolver }
    }

    /// The save/restore stack.
    #[must_use]
    pub fn stack(&self) -> ContextStack<'a> {
        ContextStack::new(&self.names.here_stack)
    }

    /// The directory relative words are resolved against right now.
    ///
    /// While `here` is undefined (or blank) no context was ever established,
    /// and the directory of the first file in `MAKEFILE_LIST` is used; with
    /// an empty `MAKEFILE_LIST` the host's working directory is used.
    /// Otherwise the value of `here` is resolved against the working
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns a resolution error if the context cannot be turned into a
    /// canonical path, or a host error if the host cannot be queried.
    pub fn current<H: Host + ?Sized>(&self, host: &mut H) -> Result<CanonicalPath> {
        let working_dir = host.working_dir()?;

        match host.variable(&self.names.here)? {
            Some(here) if !here.trim().is_empty() => {
                self.resolver.resolve(here.trim(), &working_dir)
            }
            _ => self.default_context(host, &working_dir),
        }
    }

    /// The context used before any `here` is established.
    fn default_context<H: Host + ?Sized>(
        &self,
        host: &mut H,
        working_dir: &std::path::Path,
    ) -> Result<CanonicalPath> {
        let makefiles = host.words(MAKEFILE_LIST)?;
        match makefiles.first() {
            Some(first) => Ok(self.resolver.resolve(first, working_dir)?.parent()),
            None => {
                let cwd = working_dir.to_string_lossy();
                self.resolver.resolve(&cwd, working_dir)
            }
        }
    }

    /// The raw value of `here`, `None` while undefined.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot be queried.
    pub fn here<V: VariableStore + ?Sized>(&self, vars: &mut V) -> Result<Option<String>> {
        vars.variable(&self.names.here)
    }

    /// Make `dir` the current context.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects the assignment.
    pub fn set_current<V: VariableStore + ?Sized>(
        &self,
        vars: &mut V,
        dir: &CanonicalPath,
    ) -> Result<()> {
        vars.set_variable(&self.names.here, dir.as_str())
    }

    /// Save `current` and switch to `next`.
    ///
    /// Every successful `enter` must be matched by exactly one
    /// [`Context::leave`].
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects either update. If the switch
    /// fails after the push, the push is undone before returning; a failure
    /// to undo it is logged and the switch error is returned.
    pub fn enter<V: VariableStore + ?Sized>(
        &self,
        vars: &mut V,
        current: &CanonicalPath,
        next: &CanonicalPath,
    ) -> Result<()> {
        self.stack().push(vars, current.as_str())?;
        if let Err(e) = self.set_current(vars, next) {
            if let Err(undo) = self.stack().pop(vars) {
                log::warn!(
                    "could not undo push of {current} onto {}: {undo}",
                    self.names.here_stack
                );
            }
            return Err(e);
        }
        Ok(())
    }

    /// Restore the context saved by the matching [`Context::enter`].
    ///
    /// `saved` is what was pushed; it is used if the build description
    /// emptied the stack in the meantime.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot be queried or updated.
    pub fn leave<V: VariableStore + ?Sized>(
        &self,
        vars: &mut V,
        saved: &CanonicalPath,
    ) -> Result<()> {
        match self.stack().pop(vars)? {
            Some(previous) => vars.set_variable(&self.names.here, &previous),
            None => {
                log::warn!(
                    "{} was emptied during an inclusion; restoring {saved}",
                    self.names.here_stack
                );
                self.set_current(vars, saved)
            }
        }
    }
}
