//! Config command for inspecting the effective configuration.

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::config::{CliConfig, ConfigLoader};

/// Configuration commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the merged configuration
    Show,
    /// Show where config files are read from
    Path,
}

/// Run the config command
pub fn run(args: ConfigArgs, config: &CliConfig) -> Result<()> {
    match args.command {
        ConfigCommand::Show => {
            print!("{}", render(config)?);
        }
        ConfigCommand::Path => {
            match ConfigLoader::user_config_path() {
                Some(path) => println!("user:    {}", path.display()),
                None => println!("user:    (unavailable)"),
            }
            println!("project: {}", ConfigLoader::project_config_path().display());
        }
    }
    Ok(())
}

fn render(config: &CliConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}
