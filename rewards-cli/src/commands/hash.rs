//! Hash command for computing the value passed to `assign --hashed-history-id`.

use anyhow::Result;
use clap::Args;
use rewards_core::{HistoryHasher, Sha256HistoryHasher};

/// Arguments for the `hash` command
#[derive(Debug, Args)]
pub struct HashArgs {
    /// Raw history id
    pub history_id: String,
}

/// Run the hash command
pub fn run(args: HashArgs) -> Result<()> {
    println!("{}", Sha256HistoryHasher.hash_history_id(&args.history_id));
    Ok(())
}
