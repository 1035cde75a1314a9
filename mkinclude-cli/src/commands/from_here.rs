//! Command to evaluate `$(from-here LIST)` outside of make.

use crate::error::CliError;
use crate::utils::{build_includer, path_word, resolve_dir, GlobalOptions};
use clap::Args;
use mkinclude::host::{Evaluator, Location, MemoryVariables, VariableStore, MAKEFILE_LIST};
use std::path::PathBuf;

/// Resolve a word list against a context directory, as `$(from-here)` would.
#[derive(Args)]
pub struct FromHereCommand {
    /// Whitespace-separated words to resolve
    #[arg(value_name = "LIST")]
    pub list: String,

    /// Current context directory (the value of `here`)
    #[arg(long, value_name = "DIR")]
    pub here: Option<PathBuf>,

    /// Build description being parsed, used when no context is set
    #[arg(long, value_name = "FILE")]
    pub makefile: Option<PathBuf>,
}

/// A host with nothing but variables and a working directory.
struct StaticHost {
    vars: MemoryVariables,
    cwd: PathBuf,
}

impl Evaluator for StaticHost {
    fn expand(&mut self, text: &str) -> mkinclude::Result<String> {
        Ok(text.to_string())
    }

    fn evaluate(&mut self, _statement: &str, _location: &Location) -> mkinclude::Result<()> {
        Ok(())
    }

    fn working_dir(&mut self) -> mkinclude::Result<PathBuf> {
        Ok(self.cwd.clone())
    }
}

impl VariableStore for StaticHost {
    fn variable(&mut self, name: &str) -> mkinclude::Result<Option<String>> {
        self.vars.variable(name)
    }

    fn set_variable(&mut self, name: &str, value: &str) -> mkinclude::Result<()> {
        self.vars.set_variable(name, value)
    }
}

impl FromHereCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let includer = build_includer(global)?;
        let mut host = StaticHost {
            vars: MemoryVariables::new(),
            cwd: resolve_dir(None)?,
        };

        if let Some(here) = &self.here {
            let dir = resolve_dir(Some(here))?;
            let name = includer.config().variable_names().here;
            host.vars.set_variable(&name, path_word(&dir)?)?;
        }

        if let Some(makefile) = &self.makefile {
            host.vars.append_word(MAKEFILE_LIST, path_word(makefile)?);
        }

        let text = includer.from_here_text(&mut host, &self.list)?;
        println!("{text}");
        Ok(())
    }
}
