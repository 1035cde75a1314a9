//! Command to print canonical paths.

use crate::error::CliError;
use crate::utils::{build_includer, resolve_dir, GlobalOptions};
use clap::Args;
use std::path::PathBuf;

/// Print the canonical form of each path, one per line.
#[derive(Args)]
pub struct ResolveCommand {
    /// Paths to resolve
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<String>,

    /// Directory relative paths are resolved against (default: CWD)
    #[arg(long, value_name = "DIR")]
    pub base: Option<PathBuf>,
}

impl ResolveCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let includer = build_includer(global)?;
        let base = resolve_dir(self.base.as_deref())?;

        let mut failed = 0;
        for path in &self.paths {
            match includer.resolver().resolve(path, &base) {
                Ok(canonical) => println!("{canonical}"),
                Err(e) if e.is_resolution() => {
                    global.logger.warn(&e.to_string());
                    failed += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        if failed > 0 {
            return Err(CliError::SemanticFailure(format!(
                "{failed} path(s) could not be resolved"
            )));
        }
        Ok(())
    }
}
