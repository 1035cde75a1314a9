//! Command to show the configuration in effect.

use crate::error::CliError;
use crate::utils::{load_configuration, GlobalOptions};
use clap::{Args, ValueEnum};
use mkinclude::config::{Config, ConfigLoader, VariableConfig};

/// Show the configuration in effect, with every default filled in.
#[derive(Args)]
pub struct ShowConfigCommand {
    /// Output format
    #[arg(long, value_enum, default_value = "yaml", ignore_case = true)]
    pub format: ConfigFormat,
}

/// Output format for show-config.
#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum ConfigFormat {
    /// YAML, in the same shape as a configuration file
    Yaml,
    /// JSON
    Json,
}

/// `config` with every accessor's default written out.
fn effective(config: &Config) -> Config {
    let names = config.variable_names();
    Config {
        variables: Some(VariableConfig {
            here: Some(names.here),
            here_stack: Some(names.here_stack),
            past_includes: Some(names.past_includes),
        }),
        location: Some(config.location_mode()),
        follow_symlinks: Some(config.follow_symlinks()),
        expand_tilde: Some(config.expand_tilde()),
        log_mode: Some(config.log_level()),
    }
}

impl ShowConfigCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = effective(&load_configuration(global)?);

        match self.format {
            ConfigFormat::Yaml => {
                let sources = ConfigLoader::load_all(global.config.as_deref())
                    .map_err(|e| CliError::Config(e.to_string()))?;
                for source in &sources {
                    println!("# loaded from {}", source.path.display());
                }
                let yaml = serde_yaml::to_string(&config)
                    .map_err(|e| CliError::Config(e.to_string()))?;
                print!("{yaml}");
            }
            ConfigFormat::Json => {
                let json = serde_json::to_string_pretty(&config)
                    .map_err(|e| CliError::Config(e.to_string()))?;
                println!("{json}");
            }
        }
        Ok(())
    }
}
