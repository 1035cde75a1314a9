//! Common test utilities for integration tests.
//!
//! [`ScriptedHost`] stands in for GNU make: fragments are scripts of make
//! function calls keyed by absolute path, and evaluating `include X` runs the
//! script of `X`, calling back into the [`Includer`] the way make's parser
//! would.

use std::collections::HashMap;
use std::path::PathBuf;

use mkinclude::host::{Evaluator, Location, MemoryVariables, VariableStore, MAKEFILE_LIST};
use mkinclude::{Error, Includer, PathResolver, Result};

/// One make function call inside a fragment.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum Action {
    /// `$(include-once ARGS)`
    IncludeOnce(Vec<String>),
    /// `$(include-once-debug ARGS)`
    IncludeOnceDebug(Vec<String>),
    /// `$(include-subsystem FILE)`
    IncludeSubsystem(String),
    /// `NAME := $(from-here LIST)`
    FromHere { list: String, into: String },
    /// `NAME := $(here)`, evaluated by the host itself.
    SnapshotHere { into: String },
    /// A parse error in the fragment.
    Fail(String),
}

#[allow(dead_code)]
pub fn include_once(args: &[&str]) -> Action {
    Action::IncludeOnce(args.iter().map(|s| (*s).to_string()).collect())
}

#[allow(dead_code)]
pub fn include_subsystem(file: &str) -> Action {
    Action::IncludeSubsystem(file.to_string())
}

#[allow(dead_code)]
pub fn from_here(list: &str, into: &str) -> Action {
    Action::FromHere {
        list: list.to_string(),
        into: into.to_string(),
    }
}

#[allow(dead_code)]
pub fn snapshot_here(into: &str) -> Action {
    Action::SnapshotHere {
        into: into.to_string(),
    }
}

/// Maximum nesting before the host gives up, like make's include depth.
const MAX_DEPTH: usize = 64;

/// A fake make that re-enters an [`Includer`].
pub struct ScriptedHost<'a> {
    includer: &'a Includer,
    resolver: PathResolver,
    cwd: PathBuf,
    fragments: HashMap<String, Vec<Action>>,
    depth: usize,
    /// Host variables, including `MAKEFILE_LIST`.
    pub vars: MemoryVariables,
    /// Every statement evaluated, in order.
    pub evaluated: Vec<String>,
    /// Absolute paths of the fragments actually parsed, in order.
    pub parsed: Vec<String>,
}

#[allow(dead_code)]
impl<'a> ScriptedHost<'a> {
    /// A host whose working directory is `cwd`.
    pub fn new(includer: &'a Includer, cwd: &str) -> Self {
        Self {
            includer,
            resolver: PathResolver::new(),
            cwd: PathBuf::from(cwd),
            fragments: HashMap::new(),
            depth: 0,
            vars: MemoryVariables::new(),
            evaluated: Vec::new(),
            parsed: Vec::new(),
        }
    }

    /// Register a fragment at absolute `path`.
    pub fn fragment(mut self, path: &str, actions: Vec<Action>) -> Self {
        self.fragments.insert(path.to_string(), actions);
        self
    }

    /// Parse `top` as the outermost build description.
    pub fn run(&mut self, top: &str) -> Result<()> {
        self.vars.append_word(MAKEFILE_LIST, top);
        let path = self.absolute(top)?;
        self.parse(&path)
    }

    /// Value of a host variable, `None` while undefined.
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name)
    }

    /// How many times `path` was parsed.
    pub fn parse_count(&self, path: &str) -> usize {
        self.parsed.iter().filter(|p| *p == path).count()
    }

    fn absolute(&self, file: &str) -> Result<String> {
        Ok(self.resolver.resolve(file, &self.cwd)?.into_string())
    }

    fn parse(&mut self, path: &str) -> Result<()> {
        let Some(actions) = self.fragments.get(path).cloned() else {
            return Err(Error::HostEvaluation {
                statement: format!("include {path}"),
                reason: "No such file or directory".to_string(),
            });
        };

        if self.depth >= MAX_DEPTH {
            return Err(Error::HostEvaluation {
                statement: format!("include {path}"),
                reason: "include nesting too deep".to_string(),
            });
        }

        self.parsed.push(path.to_string());
        self.depth += 1;
        let result = self.run_actions(actions);
        self.depth -= 1;
        result
    }

    fn run_actions(&mut self, actions: Vec<Action>) -> Result<()> {
        let includer = self.includer;
        for action in actions {
            match action {
                Action::IncludeOnce(args) => includer.include_once(self, args.as_slice())?,
                Action::IncludeOnceDebug(args) => includer.include_once_debug(self, args.as_slice())?,
                Action::IncludeSubsystem(file) => includer.include_subsystem(self, &file)?,
                Action::FromHere { list, into } => {
                    let text = includer.from_here_text(self, &list)?;
                    self.vars.set_variable(&into, &text)?;
                }
                Action::SnapshotHere { into } => {
                    let here = self.vars.get("here").unwrap_or_default().to_string();
                    self.vars.set_variable(&into, &here)?;
                }
                Action::Fail(reason) => {
                    return Err(Error::HostEvaluation {
                        statement: "<fragment>".to_string(),
                        reason,
                    })
                }
            }
        }
        Ok(())
    }
}

impl Evaluator for ScriptedHost<'_> {
    fn expand(&mut self, text: &str) -> Result<String> {
        Ok(text.to_string())
    }

    fn evaluate(&mut self, statement: &str, _location: &Location) -> Result<()> {
        self.evaluated.push(statement.to_string());

        let Some(file) = statement.strip_prefix("include ") else {
            return Ok(());
        };
        let file = file.trim();
        self.vars.append_word(MAKEFILE_LIST, file);
        let path = self.absolute(file)?;
        self.parse(&path)
    }

    fn working_dir(&mut self) -> Result<PathBuf> {
        Ok(self.cwd.clone())
    }
}

impl VariableStore for ScriptedHost<'_> {
    fn variable(&mut self, name: &str) -> Result<Option<String>> {
        self.vars.variable(name)
    }

    fn set_variable(&mut self, name: &str, value: &str) -> Result<()> {
        self.vars.set_variable(name, value)
    }
}
