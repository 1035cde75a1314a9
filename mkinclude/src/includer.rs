//! The four make functions behind one state object.
//!
//! [`Includer`] owns everything the functions remember between calls: the
//! include-once registry and the configuration. Context and the subsystem set
//! live in host variables and are borrowed through the [`Host`] passed to
//! each call.

use crate::config::{Config, ConfigBuilder, LocationMode, VariableNames};
use crate::context::Context;
use crate::error::Result;
use crate::host::{Host, Location, VariableStore, MAKEFILE_LIST};
use crate::logging::Logger;
use crate::path::{CanonicalPath, PathResolver};
use crate::registry::IncludeOnceRegistry;
use crate::subsystem::{SubsystemDriver, SubsystemSet};

/// Implementation of `include-once`, `include-once-debug`, `from-here` and
/// `include-subsystem`.
///
/// All methods take `&self`: the host may call back into the same
/// `Includer` while evaluating an inclusion, before the outer call returns.
///
/// # Examples
///
/// ```
/// use mkinclude::config::Config;
/// use mkinclude::host::{Evaluator, Location, MemoryVariables, VariableStore};
/// use mkinclude::{Includer, Result};
/// use std::path::PathBuf;
///
/// struct Host {
///     vars: MemoryVariables,
///     evaluated: Vec<String>,
/// }
///
/// impl Evaluator for Host {
///     fn expand(&mut self, text: &str) -> Result<String> {
///         Ok(text.to_string())
///     }
///     fn evaluate(&mut self, statement: &str, _: &Location) -> Result<()> {
///         self.evaluated.push(statement.to_string());
///         Ok(())
///     }
///     fn working_dir(&mut self) -> Result<PathBuf> {
///         Ok(PathBuf::from("/proj"))
///     }
/// }
///
/// impl VariableStore for Host {
///     fn variable(&mut self, name: &str) -> Result<Option<String>> {
///         self.vars.variable(name)
///     }
///     fn set_variable(&mut self, name: &str, value: &str) -> Result<()> {
///         self.vars.set_variable(name, value)
///     }
/// }
///
/// let includer = Includer::new(Config::default());
/// let mut host = Host { vars: MemoryVariables::new(), evaluated: Vec::new() };
///
/// includer.include_once(&mut host, &["common.mk"]).unwrap();
/// includer.include_once(&mut host, &["./lib/../common.mk"]).unwrap();
/// assert_eq!(host.evaluated, vec!["include common.mk"]);
/// ```
#[derive(Debug)]
pub struct Includer {
    config: Config,
    names: VariableNames,
    resolver: PathResolver,
    logger: Logger,
    registry: IncludeOnceRegistry,
}

impl Includer {
    /// Create an includer with an empty registry.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let resolver = PathResolver::new()
            .with_symlink_following(config.follow_symlinks())
            .with_tilde_expansion(config.expand_tilde());

        Self {
            names: config.variable_names(),
            logger: Logger::new(config.log_level()),
            resolver,
            config,
            registry: IncludeOnceRegistry::new(),
        }
    }

    /// Create an includer from the layered configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or is invalid.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(ConfigBuilder::new().build()?))
    }

    /// Replace the logger used for non-debug calls.
    #[must_use]
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// The configuration in effect.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The path resolver in effect.
    #[must_use]
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// The include-once registry.
    #[must_use]
    pub fn registry(&self) -> &IncludeOnceRegistry {
        &self.registry
    }

    /// `$(include-once PATH...)`.
    ///
    /// # Errors
    ///
    /// Returns the host's error if it fails to query a variable or to
    /// evaluate an inclusion. Paths that cannot be resolved are skipped.
    pub fn include_once<H, S>(&self, host: &mut H, args: &[S]) -> Result<()>
    where
        H: Host + ?Sized,
        S: AsRef<str>,
    {
        self.include_once_with(host, args, self.logger)
    }

    /// `$(include-once-debug PATH...)`: like [`Includer::include_once`],
    /// reporting every decision on stderr.
    ///
    /// # Errors
    ///
    /// As for [`Includer::include_once`].
    pub fn include_once_debug<H, S>(&self, host: &mut H, args: &[S]) -> Result<()>
    where
        H: Host + ?Sized,
        S: AsRef<str>,
    {
        self.include_once_with(host, args, self.logger.escalated(true))
    }

    fn include_once_with<H, S>(&self, host: &mut H, args: &[S], logger: Logger) -> Result<()>
    where
        H: Host + ?Sized,
        S: AsRef<str>,
    {
        let working_dir = match host.working_dir() {
            Ok(dir) => dir,
            Err(e) if e.is_resolution() => {
                logger.debug(&format!("include_once: {e}"));
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        let location = self.location(host)?;

        for path in args.iter().flat_map(|arg| arg.as_ref().split_whitespace()) {
            let canonical = match self.resolver.resolve(path, &working_dir) {
                Ok(canonical) => canonical,
                Err(e) => {
                    logger.debug(&format!("include_once (\"{path}\"): {e}"));
                    continue;
                }
            };

            logger.debug(&format!("include_once (\"{path}\", abspath \"{canonical}\")"));

            match self.registry.record(&canonical) {
                Ok(true) => {
                    logger.debug(&format!("Really including: \"{path}\""));
                    host.evaluate(&format!("include {path}"), &location)?;
                }
                Ok(false) => {
                    logger.debug(&format!(
                        "Was already included: \"{path}\" (abspath: \"{canonical}\")"
                    ));
                }
                Err(e) => logger.debug(&format!("include_once: {e}")),
            }
        }

        Ok(())
    }

    /// `$(from-here LIST)`: the words of `list` resolved against the
    /// current context.
    ///
    /// # Errors
    ///
    /// Returns the host's error if it cannot be queried.
    pub fn from_here<H: Host + ?Sized>(
        &self,
        host: &mut H,
        list: &str,
    ) -> Result<Vec<CanonicalPath>> {
        self.driver().from_here(host, list)
    }

    /// [`Includer::from_here`] as the space-joined text make receives.
    ///
    /// # Errors
    ///
    /// As for [`Includer::from_here`].
    pub fn from_here_text<H: Host + ?Sized>(&self, host: &mut H, list: &str) -> Result<String> {
        let paths = self.from_here(host, list)?;
        Ok(paths
            .iter()
            .map(CanonicalPath::as_str)
            .collect::<Vec<_>>()
            .join(" "))
    }

    /// `$(include-subsystem FILE)`.
    ///
    /// # Errors
    ///
    /// Returns the first host error once every word has been tried; the
    /// context is restored after each word.
    pub fn include_subsystem<H: Host + ?Sized>(&self, host: &mut H, arg: &str) -> Result<()> {
        let location = self.location(host)?;
        self.driver().include_subsystem(host, arg, &location)
    }

    /// Access to the current context through this includer's variable names.
    #[must_use]
    pub fn context(&self) -> Context<'_> {
        Context::new(&self.names, &self.resolver)
    }

    /// The subsystem set through this includer's variable names.
    #[must_use]
    pub fn subsystems(&self) -> SubsystemSet<'_> {
        SubsystemSet::new(&self.names.past_includes)
    }

    fn driver(&self) -> SubsystemDriver<'_> {
        SubsystemDriver::new(self.context(), self.subsystems(), &self.resolver, self.logger)
    }

    /// The location attached to statements evaluated by the current call.
    fn location<V: VariableStore + ?Sized>(&self, vars: &mut V) -> Result<Location> {
        match self.config.location_mode() {
            LocationMode::Placeholder => Ok(Location::placeholder()),
            LocationMode::Provenance => Ok(vars
                .words(MAKEFILE_LIST)?
                .pop()
                .map_or_else(Location::placeholder, |file| Location::new(file, 0))),
        }
    }
}

impl Default for Includer {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::host::{Evaluator, MemoryVariables};
    use std::path::PathBuf;

    #[derive(Default)]
    struct RecordingHost {
        vars: MemoryVariables,
        evaluated: Vec<(String, Location)>,
        fail_on: Option<String>,
    }

    impl Evaluator for RecordingHost {
        fn expand(&mut self, text: &str) -> Result<String> {
            Ok(text.to_string())
        }

        fn evaluate(&mut self, statement: &str, location: &Location) -> Result<()> {
            self.evaluated.push((statement.to_string(), location.clone()));
            if self.fail_on.as_deref() == Some(statement) {
                return Err(Error::HostEvaluation {
                    statement: statement.to_string(),
                    reason: "No such file or directory".to_string(),
                });
            }
            Ok(())
        }

        fn working_dir(&mut self) -> Result<PathBuf> {
            Ok(PathBuf::from("/proj"))
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

    impl RecordingHost {
        fn statements(&self) -> Vec<&str> {
            self.evaluated.iter().map(|(s, _)| s.as_str()).collect()
        }
    }

    #[test]
    fn test_include_once_uses_original_spelling() {
        let includer = Includer::default();
        let mut host = RecordingHost::default();

        includer.include_once(&mut host, &["./sub/../a.mk"]).unwrap();
        assert_eq!(host.statements(), vec!["include ./sub/../a.mk"]);
        assert!(includer
            .registry()
            .contains(&includer.resolver().resolve_absolute("/proj/a.mk").unwrap()));
    }

    #[test]
    fn test_include_once_equivalent_spellings() {
        let includer = Includer::default();
        let mut host = RecordingHost::default();

        includer
            .include_once(&mut host, &["a.mk", "/proj/a.mk", "x/../a.mk"])
            .unwrap();
        includer.include_once_debug(&mut host, &["./a.mk"]).unwrap();

        assert_eq!(host.statements(), vec!["include a.mk"]);
        assert_eq!(includer.registry().len(), 1);
    }

    #[test]
    fn test_include_once_ignores_context() {
        let includer = Includer::default();
        let mut host = RecordingHost::default();
        host.vars.set_variable("here", "/elsewhere").unwrap();

        includer.include_once(&mut host, &["a.mk"]).unwrap();
        assert_eq!(includer.registry().paths()[0].as_str(), "/proj/a.mk");
    }

    #[test]
    fn test_include_once_skips_unresolvable_and_continues() {
        let includer = Includer::default();
        let mut host = RecordingHost::default();

        includer.include_once(&mut host, &["bad\0.mk", "good.mk"]).unwrap();
        assert_eq!(host.statements(), vec!["include good.mk"]);
    }

    #[test]
    fn test_include_once_records_before_host_failure() {
        let includer = Includer::default();
        let mut host = RecordingHost {
            fail_on: Some("include missing.mk".to_string()),
            ..Default::default()
        };

        let err = includer.include_once(&mut host, &["missing.mk"]).unwrap_err();
        assert!(err.is_host_evaluation());
        assert_eq!(includer.registry().len(), 1);

        includer.include_once(&mut host, &["missing.mk"]).unwrap();
        assert_eq!(host.evaluated.len(), 1);
    }

    #[test]
    fn test_from_here_text() {
        let includer = Includer::default();
        let mut host = RecordingHost::default();
        host.vars.set_variable("here", "/base").unwrap();

        let text = includer.from_here_text(&mut host, "rel1 /abs2 rel3").unwrap();
        assert_eq!(text, "/base/rel1 /abs2 /base/rel3");
    }

    #[test]
    fn test_provenance_location() {
        let includer = Includer::default();
        let mut host = RecordingHost::default();
        host.vars.set_variable(MAKEFILE_LIST, "Makefile sub/sub.mk").unwrap();

        includer.include_once(&mut host, &["a.mk"]).unwrap();
        assert_eq!(host.evaluated[0].1, Location::new("sub/sub.mk", 0));
    }

    #[test]
    fn test_provenance_without_makefile_list_is_placeholder() {
        let includer = Includer::default();
        let mut host = RecordingHost::default();

        includer.include_subsystem(&mut host, "sub/a.mk").unwrap();
        assert!(host.evaluated[0].1.is_placeholder());
    }

    #[test]
    fn test_placeholder_location_mode() {
        let includer = Includer::new(Config {
            location: Some(LocationMode::Placeholder),
            ..Default::default()
        });
        let mut host = RecordingHost::default();
        host.vars.set_variable(MAKEFILE_LIST, "Makefile").unwrap();

        includer.include_once(&mut host, &["a.mk"]).unwrap();
        assert!(host.evaluated[0].1.is_placeholder());
    }

    #[test]
    fn test_custom_variable_names() {
        let includer = Includer::new(Config {
            variables: Some(crate::config::VariableConfig {
                here: Some("HERE".to_string()),
                here_stack: Some("HERE_STACK".to_string()),
                past_includes: Some("SEEN".to_string()),
            }),
            ..Default::default()
        });
        let mut host = RecordingHost::default();
        host.vars.set_variable("HERE", "/proj").unwrap();

        includer.include_subsystem(&mut host, "sub/a.mk").unwrap();

        assert_eq!(host.vars.get("SEEN"), Some("/proj/sub/a.mk"));
        assert_eq!(host.vars.get("HERE"), Some("/proj"));
        assert_eq!(host.vars.get("HERE_STACK"), Some(""));
        assert_eq!(host.vars.get("past_includes"), None);
    }

    #[test]
    fn test_dedup_sets_are_independent() {
        let includer = Includer::default();
        let mut host = RecordingHost::default();
        host.vars.set_variable("here", "/proj").unwrap();

        includer.include_once(&mut host, &["/proj/sub/a.mk"]).unwrap();
        includer.include_subsystem(&mut host, "sub/a.mk").unwrap();

        assert_eq!(host.evaluated.len(), 2);
        assert_eq!(includer.registry().len(), 1);
        assert_eq!(host.vars.get("past_includes"), Some("/proj/sub/a.mk"));
    }
}
