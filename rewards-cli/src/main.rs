use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod records;
mod shutdown;

use config::ConfigLoader;
use shutdown::Shutdown;

#[derive(Parser)]
#[command(name = "rewards", about = "Attribute rewards to decision logs")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Extra config file, applied over user and project config
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Assign rewards to the decisions in a record batch
    Assign(commands::assign::AssignArgs),
    /// Inspect the effective configuration
    Config(commands::config::ConfigArgs),
    /// Print the hash of a history id
    Hash(commands::hash::HashArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = ConfigLoader::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Assign(args) => commands::assign::run(args, &config, &Shutdown::install()),
        Commands::Config(args) => commands::config::run(args, &config),
        Commands::Hash(args) => commands::hash::run(args),
    }
}
