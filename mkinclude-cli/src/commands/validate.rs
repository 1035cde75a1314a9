//! Command to validate mkinclude configuration files.

use crate::error::CliError;
use crate::utils::GlobalOptions;
use clap::Args;
use mkinclude::config::{ConfigLoader, ConfigValidator};
use std::path::PathBuf;

/// Check configuration files without loading them into a run.
#[derive(Args)]
pub struct ValidateCommand {
    /// Configuration files to validate
    #[arg(value_name = "CONFIG_PATH", required = true)]
    pub config_paths: Vec<PathBuf>,
}

impl ValidateCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        if let Some(missing) = self.config_paths.iter().find(|p| !p.exists()) {
            return Err(CliError::InvalidArguments(format!(
                "File not found: {}",
                missing.display()
            )));
        }

        let mut invalid = 0;
        for path in &self.config_paths {
            let checked = ConfigLoader::load_file(path)
                .and_then(|config| ConfigValidator::validate(&config));
            match checked {
                Ok(()) => {
                    if !global.quiet {
                        println!("{}: valid", path.display());
                    }
                }
                Err(e) => {
                    eprintln!("{}: {e}", path.display());
                    invalid += 1;
                }
            }
        }

        if invalid > 0 {
            return Err(CliError::SemanticFailure(format!(
                "{invalid} of {} configuration file(s) invalid",
                self.config_paths.len()
            )));
        }
        Ok(())
    }
}
