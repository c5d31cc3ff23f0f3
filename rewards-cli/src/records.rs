//! JSON Lines decoding of record batches and encoding of decision logs

use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use rewards_core::{Record, RewardedDecisions};
use tracing::warn;

static MODEL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").expect("model name pattern is valid")
});

/// Decode one record per non-empty line
///
/// Lines that are not valid records are skipped with a warning; IO errors
/// abort the read.
pub fn read_records(reader: impl BufRead) -> Result<Vec<Record>> {
    let mut records = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read records")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<Record>(line) {
            Ok(record) => records.push(record),
            Err(e) => warn!(line = idx + 1, error = %e, "Skipping undecodable record"),
        }
    }

    Ok(records)
}

/// Whether `model` can be used as a log file name
pub fn is_safe_model_name(model: &str) -> bool {
    MODEL_NAME.is_match(model)
}

/// Write one `<model>.jsonl` per model into `dir`
///
/// Returns the number of files written. Models whose name is not a safe
/// file name are skipped.
pub fn write_model_logs(dir: &Path, decisions: &RewardedDecisions) -> Result<usize> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut written = 0;
    for (model, model_decisions) in decisions {
        if !is_safe_model_name(model) {
            warn!(model = %model, "Skipping model with unsafe name");
            continue;
        }

        let path = dir.join(format!("{model}.jsonl"));
        let file =
            File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        for decision in model_decisions {
            serde_json::to_writer(&mut writer, decision)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        written += 1;
    }

    Ok(written)
}

/// Write all decisions as a single JSON object keyed by model
pub fn write_json(mut writer: impl Write, decisions: &RewardedDecisions) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, decisions)?;
    writer.write_all(b"\n")?;
    Ok(())
}
