//! Assign command: filter a record batch and attribute its rewards.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use rewards_core::{RewardAssigner, RewardConfig, Sha256HistoryHasher, filter_records};
use tracing::{info, warn};

use crate::config::{CliConfig, parse_window};
use crate::records::{read_records, write_json, write_model_logs};
use crate::shutdown::Shutdown;

/// Arguments for the `assign` command
#[derive(Debug, Args)]
pub struct AssignArgs {
    /// JSON Lines file of records ("-" reads stdin)
    #[arg(short, long, default_value = "-")]
    pub input: PathBuf,

    /// Hex SHA-256 of the history id the batch must belong to
    #[arg(long)]
    pub hashed_history_id: String,

    /// Write one <model>.jsonl per model here instead of JSON to stdout
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Override the configured reward window (e.g. "30m")
    #[arg(long, value_parser = parse_window_arg)]
    pub reward_window: Option<Duration>,
}

/// Counts reported after a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignSummary {
    pub read: usize,
    pub kept: usize,
    pub decisions: usize,
    pub models: usize,
}

fn parse_window_arg(value: &str) -> Result<Duration, String> {
    parse_window(value).map_err(|e| e.to_string())
}

/// Run the assign command
pub fn run(args: AssignArgs, config: &CliConfig, shutdown: &Shutdown) -> Result<()> {
    let summary = if args.input.as_os_str() == "-" {
        let stdin = std::io::stdin();
        execute(&args, config, shutdown, stdin.lock(), std::io::stdout().lock())?
    } else {
        let file = File::open(&args.input)
            .with_context(|| format!("Failed to open {}", args.input.display()))?;
        execute(
            &args,
            config,
            shutdown,
            BufReader::new(file),
            std::io::stdout().lock(),
        )?
    };

    info!(
        read = summary.read,
        kept = summary.kept,
        decisions = summary.decisions,
        models = summary.models,
        "Assigned rewards"
    );
    Ok(())
}

/// Read, filter, join and write one batch
pub fn execute(
    args: &AssignArgs,
    config: &CliConfig,
    shutdown: &Shutdown,
    input: impl BufRead,
    stdout: impl Write,
) -> Result<AssignSummary> {
    let records = read_records(input)?;
    let read = records.len();
    shutdown.check("filtering")?;

    let batch = filter_records(&args.hashed_history_id, records, &Sha256HistoryHasher);
    if batch.records.is_empty() && read > 0 {
        warn!("No record matched the hashed history id");
    }
    shutdown.check("joining")?;

    let assigner = RewardAssigner::new(effective_config(args, config));
    let decisions = assigner
        .assign_rewards(&batch.records)
        .context("Failed to assign rewards")?;
    shutdown.check("writing")?;

    match &args.output_dir {
        Some(dir) => {
            write_model_logs(dir, &decisions)?;
        }
        None => write_json(stdout, &decisions)?,
    }

    Ok(AssignSummary {
        read,
        kept: batch.records.len(),
        decisions: decisions.values().map(Vec::len).sum(),
        models: decisions.len(),
    })
}

fn effective_config(args: &AssignArgs, config: &CliConfig) -> RewardConfig {
    let mut rewards = config.rewards.clone();
    if let Some(window) = args.reward_window {
        rewards.reward_window = window;
    }
    rewards
}
