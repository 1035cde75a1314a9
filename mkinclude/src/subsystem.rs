//! Subsystem inclusion: `from-here` and `include-subsystem`.
//!
//! A subsystem is a fragment included with its own directory as the current
//! context, so that it can name its siblings with relative paths. Entry
//! points already included are remembered in a host variable
//! (`past_includes`) that the build description can inspect or reset.

use std::collections::BTreeSet;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::host::{Host, Location, VariableStore};
use crate::logging::Logger;
use crate::path::{CanonicalPath, PathResolver};

/// Sorted, duplicate-free set of paths stored as words of a host variable.
///
/// The set only grows by sorted union; its text is always the sorted words
/// joined by single spaces.
///
/// # Examples
///
/// ```
/// use mkinclude::host::MemoryVariables;
/// use mkinclude::path::PathResolver;
/// use mkinclude::subsystem::SubsystemSet;
///
/// let resolver = PathResolver::new();
/// let mut vars = MemoryVariables::new();
/// let set = SubsystemSet::new("past_includes");
///
/// let b = resolver.resolve_absolute("/proj/b.mk").unwrap();
/// let a = resolver.resolve_absolute("/proj/a.mk").unwrap();
/// assert!(set.insert(&mut vars, &b).unwrap());
/// assert!(set.insert(&mut vars, &a).unwrap());
/// assert!(!set.insert(&mut vars, &b).unwrap());
/// assert_eq!(vars.get("past_includes"), Some("/proj/a.mk /proj/b.mk"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SubsystemSet<'a> {
    variable: &'a str,
}

impl<'a> SubsystemSet<'a> {
    /// A set stored in the host variable `variable`.
    #[must_use]
    pub fn new(variable: &'a str) -> Self {
        Self { variable }
    }

    /// Whether `path` is a member, by exact word match.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot be queried.
    pub fn contains<V: VariableStore + ?Sized>(
        &self,
        vars: &mut V,
        path: &CanonicalPath,
    ) -> Result<bool> {
        Ok(vars.words(self.variable)?.iter().any(|w| w == path.as_str()))
    }

    /// Insert `path`, returning `true` if it was not a member.
    ///
    /// Whatever the build description stored in the variable is kept; the
    /// result is re-sorted and deduplicated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Allocation`] if the new value cannot be built, or a
    /// host error if the variable cannot be read or written. The variable is
    /// unchanged on error.
    pub fn insert<V: VariableStore + ?Sized>(
        &self,
        vars: &mut V,
        path: &CanonicalPath,
    ) -> Result<bool> {
        let mut members: BTreeSet<String> = vars.words(self.variable)?.into_iter().collect();
        if members.contains(path.as_str()) {
            return Ok(false);
        }
        members.insert(path.as_str().to_string());

        let len = members.iter().map(|m| m.len() + 1).sum::<usize>();
        let mut value = String::new();
        value.try_reserve(len).map_err(|source| Error::Allocation {
            context: format!("adding {path} to {}", self.variable),
            source,
        })?;
        for member in &members {
            if !value.is_empty() {
                value.push(' ');
            }
            value.push_str(member);
        }

        log::debug!("{} += {path} ({} entries)", self.variable, members.len());
        vars.set_variable(self.variable, &value)?;
        Ok(true)
    }

    /// Current members in sorted order.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot be queried.
    pub fn members<V: VariableStore + ?Sized>(&self, vars: &mut V) -> Result<Vec<String>> {
        let members: BTreeSet<String> = vars.words(self.variable)?.into_iter().collect();
        Ok(members.into_iter().collect())
    }
}

/// Drives `from-here` and `include-subsystem` against a host.
#[derive(Debug, Clone, Copy)]
pub struct SubsystemDriver<'a> {
    context: Context<'a>,
    set: SubsystemSet<'a>,
    resolver: &'a PathResolver,
    logger: Logger,
}

impl<'a> SubsystemDriver<'a> {
    /// Create a driver.
    #[must_use]
    pub fn new(
        context: Context<'a>,
        set: SubsystemSet<'a>,
        resolver: &'a PathResolver,
        logger: Logger,
    ) -> Self {
        Self {
            context,
            set,
            resolver,
            logger,
        }
    }

    /// Resolve each word of `list` against the current context.
    ///
    /// Absolute words, those starting with `/`, are resolved on their own;
    /// `~/x.mk` is relative unless tilde expansion is enabled. The context is
    /// looked up
    /// at most once, and only if a relative word is present. Words that
    /// cannot be resolved are reported on the debug channel and left out.
    ///
    /// # Errors
    ///
    /// Returns an error only if the host itself fails.
    pub fn from_here<H: Host + ?Sized>(
        &self,
        host: &mut H,
        list: &str,
    ) -> Result<Vec<CanonicalPath>> {
        let mut resolved = Vec::new();
        let mut context: Option<Option<CanonicalPath>> = None;

        for word in list.split_whitespace() {
            let result = if self.resolver.is_absolute(word) {
                self.resolver.resolve_absolute(word)
            } else {
                if context.is_none() {
                    context = Some(self.skip_unresolvable(word, self.context.current(host))?);
                }
                match context.as_ref().and_then(Option::as_ref) {
                    Some(dir) => self.resolver.resolve(word, dir.as_path()),
                    None => continue,
                }
            };

            if let Some(path) = self.skip_unresolvable(word, result)? {
                resolved.push(path);
            }
        }

        Ok(resolved)
    }

    /// Include each word of `arg` as a subsystem.
    ///
    /// For every resolved entry point the current context is saved and
    /// replaced by the entry point's directory; if the entry point is not in
    /// the subsystem set it is added and the host is asked to include it;
    /// then the saved context is restored, whether or not the inclusion
    /// succeeded. A failing word does not stop the words after it.
    ///
    /// # Errors
    ///
    /// Returns the first error met, after every word has been tried. The
    /// context is restored after each word.
    pub fn include_subsystem<H: Host + ?Sized>(
        &self,
        host: &mut H,
        arg: &str,
        location: &Location,
    ) -> Result<()> {
        let mut first_error = None;
        for target in self.from_here(host, arg)? {
            if let Err(e) = self.include_entry(host, &target, location) {
                log::debug!("include-subsystem: {target} failed: {e}");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn include_entry<H: Host + ?Sized>(
        &self,
        host: &mut H,
        target: &CanonicalPath,
        location: &Location,
    ) -> Result<()> {
        let Some(current) = self.skip_unresolvable(target.as_str(), self.context.current(host))?
        else {
            return Ok(());
        };
        self.context.enter(host, &current, &target.parent())?;

        let outcome = self.include_if_new(host, target, location);
        let restored = self.context.leave(host, &current);

        outcome?;
        restored
    }

    fn include_if_new<H: Host + ?Sized>(
        &self,
        host: &mut H,
        target: &CanonicalPath,
        location: &Location,
    ) -> Result<()> {
        match self.set.insert(host, target) {
            Ok(true) => {
                self.logger.debug(&format!("include-subsystem: including \"{target}\""));
                host.evaluate(&format!("include {target}"), location)
            }
            Ok(false) => {
                self.logger.debug(&format!("include-subsystem: already included \"{target}\""));
                Ok(())
            }
            Err(e @ Error::Allocation { .. }) => {
                self.logger.debug(&format!("include-subsystem: {e}"));
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Turn a resolution failure into a skipped word.
    fn skip_unresolvable<T>(&self, word: &str, result: Result<T>) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_resolution() => {
                self.logger.debug(&format!("skipping \"{word}\": {e}"));
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::VariableNames;
    use crate::host::{Evaluator, MemoryVariables, MAKEFILE_LIST};
    use crate::logging::LogLevel;
    use std::path::PathBuf;

    /// Host recording evaluations, with optional failure on `include`.
    #[derive(Default)]
    struct RecordingHost {
        vars: MemoryVariables,
        evaluated: Vec<String>,
        fail_includes: bool,
    }

    impl Evaluator for RecordingHost {
        fn expand(&mut self, text: &str) -> Result<String> {
            Ok(text.to_string())
        }

        fn evaluate(&mut self, statement: &str, _location: &Location) -> Result<()> {
            self.evaluated.push(statement.to_string());
            if self.fail_includes {
                return Err(Error::HostEvaluation {
                    statement: statement.to_string(),
                    reason: "No such file or directory".to_string(),
                });
            }
            Ok(())
        }

        fn working_dir(&mut self) -> Result<PathBuf> {
            Ok(PathBuf::from("/work"))
        }
    }

    impl VariableStore for RecordingHost {
        fn variable(&mut self, name: &str) -> Result<Option<String>> {
            self.vars.variable(name)
        }

        fn set_variable(&mut self, name: &str, value: &str) -> Result<()> {
            self.vars.set_variable(name, value)
        }
    }

    fn with_driver<F: FnOnce(SubsystemDriver<'_>)>(f: F) {
        let names = VariableNames::default();
        let resolver = PathResolver::new();
        let context = Context::new(&names, &resolver);
        let set = SubsystemSet::new(&names.past_includes);
        f(SubsystemDriver::new(context, set, &resolver, Logger::new(LogLevel::Quiet)));
    }

    fn strings(paths: Vec<CanonicalPath>) -> Vec<String> {
        paths.into_iter().map(CanonicalPath::into_string).collect()
    }

    #[test]
    fn test_set_keeps_sorted_union() {
        let mut vars = MemoryVariables::new();
        vars.set_variable("past_includes", "/z.mk /b.mk /b.mk").unwrap();
        let set = SubsystemSet::new("past_includes");
        let resolver = PathResolver::new();

        assert!(set.insert(&mut vars, &resolver.resolve_absolute("/a.mk").unwrap()).unwrap());
        assert_eq!(vars.get("past_includes"), Some("/a.mk /b.mk /z.mk"));
        assert_eq!(set.members(&mut vars).unwrap(), vec!["/a.mk", "/b.mk", "/z.mk"]);
    }

    #[test]
    fn test_set_contains_exact_word() {
        let mut vars = MemoryVariables::new();
        vars.set_variable("past_includes", "/proj/sub/a.mk").unwrap();
        let set = SubsystemSet::new("past_includes");
        let resolver = PathResolver::new();

        assert!(set.contains(&mut vars, &resolver.resolve_absolute("/proj/sub/a.mk").unwrap()).unwrap());
        assert!(!set.contains(&mut vars, &resolver.resolve_absolute("/proj/sub").unwrap()).unwrap());
    }

    #[test]
    fn test_from_here_mixed_words() {
        with_driver(|driver| {
            let mut host = RecordingHost::default();
            host.vars.set_variable("here", "/base").unwrap();

            let paths = driver.from_here(&mut host, "rel1 /abs2 rel3").unwrap();
            assert_eq!(strings(paths), vec!["/base/rel1", "/abs2", "/base/rel3"]);
        });
    }

    #[test]
    fn test_from_here_tilde_word_is_relative() {
        with_driver(|driver| {
            let mut host = RecordingHost::default();
            host.vars.set_variable("here", "/base").unwrap();

            let paths = driver.from_here(&mut host, "~/x.mk rel").unwrap();
            assert_eq!(strings(paths), vec!["/base/~/x.mk", "/base/rel"]);
        });
    }

    #[test]
    fn test_from_here_without_context_uses_first_makefile() {
        with_driver(|driver| {
            let mut host = RecordingHost::default();
            host.vars.set_variable(MAKEFILE_LIST, "/proj/Makefile /proj/sub/a.mk").unwrap();

            let paths = driver.from_here(&mut host, "lib/x.mk").unwrap();
            assert_eq!(strings(paths), vec!["/proj/lib/x.mk"]);
        });
    }

    #[test]
    fn test_from_here_empty_list() {
        with_driver(|driver| {
            let mut host = RecordingHost::default();
            assert!(driver.from_here(&mut host, "  ").unwrap().is_empty());
        });
    }

    #[test]
    fn test_from_here_skips_unresolvable_context() {
        with_driver(|driver| {
            let mut host = RecordingHost::default();
            host.vars.set_variable("here", "/bad\0dir").unwrap();

            let paths = driver.from_here(&mut host, "a.mk /ok.mk").unwrap();
            assert_eq!(strings(paths), vec!["/ok.mk"]);
        });
    }

    #[test]
    fn test_include_subsystem_scenario() {
        with_driver(|driver| {
            let mut host = RecordingHost::default();
            host.vars.set_variable(MAKEFILE_LIST, "/proj/top.inc").unwrap();

            driver
                .include_subsystem(&mut host, "sub/a.inc", &Location::placeholder())
                .unwrap();

            assert_eq!(host.evaluated, vec!["include /proj/sub/a.inc"]);
            assert_eq!(host.vars.get("past_includes"), Some("/proj/sub/a.inc"));
            assert_eq!(host.vars.get("here"), Some("/proj"));
            assert_eq!(host.vars.get("here_stack"), Some(""));
        });
    }

    #[test]
    fn test_include_subsystem_twice_includes_once() {
        with_driver(|driver| {
            let mut host = RecordingHost::default();
            host.vars.set_variable("here", "/proj").unwrap();

            driver.include_subsystem(&mut host, "sub/a.inc", &Location::placeholder()).unwrap();
            driver.include_subsystem(&mut host, "./sub/../sub/a.inc", &Location::placeholder()).unwrap();

            assert_eq!(host.evaluated.len(), 1);
            assert_eq!(host.vars.get("here"), Some("/proj"));
        });
    }

    #[test]
    fn test_include_subsystem_restores_on_failure() {
        with_driver(|driver| {
            let mut host = RecordingHost {
                fail_includes: true,
                ..Default::default()
            };
            host.vars.set_variable("here", "/proj").unwrap();
            host.vars.set_variable("here_stack", "/outer").unwrap();

            let err = driver
                .include_subsystem(&mut host, "sub/missing.inc", &Location::placeholder())
                .unwrap_err();

            assert!(err.is_host_evaluation());
            assert_eq!(host.vars.get("here"), Some("/proj"));
            assert_eq!(host.vars.get("here_stack"), Some("/outer"));
            assert_eq!(host.vars.get("past_includes"), Some("/proj/sub/missing.inc"));
        });
    }

    #[test]
    fn test_include_subsystem_multiple_words() {
        with_driver(|driver| {
            let mut host = RecordingHost::default();
            host.vars.set_variable("here", "/proj").unwrap();

            driver
                .include_subsystem(&mut host, "b/b.inc a/a.inc", &Location::placeholder())
                .unwrap();

            assert_eq!(host.evaluated, vec!["include /proj/b/b.inc", "include /proj/a/a.inc"]);
            assert_eq!(host.vars.get("past_includes"), Some("/proj/a/a.inc /proj/b/b.inc"));
            assert_eq!(host.vars.get("here"), Some("/proj"));
        });
    }

    #[test]
    fn test_include_subsystem_failure_does_not_skip_later_words() {
        with_driver(|driver| {
            let mut host = RecordingHost {
                fail_includes: true,
                ..Default::default()
            };
            host.vars.set_variable("here", "/proj").unwrap();

            let err = driver
                .include_subsystem(&mut host, "a/a.inc b/b.inc", &Location::placeholder())
                .unwrap_err();

            assert!(err.to_string().contains("/proj/a/a.inc"));
            assert_eq!(host.evaluated, vec!["include /proj/a/a.inc", "include /proj/b/b.inc"]);
            assert_eq!(host.vars.get("past_includes"), Some("/proj/a/a.inc /proj/b/b.inc"));
            assert_eq!(host.vars.get("here"), Some("/proj"));
            assert_eq!(host.vars.get("here_stack"), Some(""));
        });
    }

    #[test]
    fn test_include_subsystem_respects_build_reset() {
        with_driver(|driver| {
            let mut host = RecordingHost::default();
            host.vars.set_variable("here", "/proj").unwrap();

            driver.include_subsystem(&mut host, "a.inc", &Location::placeholder()).unwrap();
            host.vars.set_variable("past_includes", "").unwrap();
            driver.include_subsystem(&mut host, "a.inc", &Location::placeholder()).unwrap();

            assert_eq!(host.evaluated.len(), 2);
        });
    }
}
