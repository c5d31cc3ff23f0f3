//! Best-effort sanitizing of a record batch
//!
//! Invalid records are dropped without surfacing an error. Survivors keep
//! their input order and all share the history id of the first valid record.

use tracing::{debug, trace};

use crate::hash::HistoryHasher;
use crate::record::Record;
use crate::validate::validate_record;

/// Records that passed validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredBatch {
    /// Valid records in input order
    pub records: Vec<Record>,
    /// History id established by the first valid record
    pub history_id: Option<String>,
    /// Number of records that were dropped
    pub dropped: usize,
}

/// Filter `records`, also reporting the established history id
pub fn filter_records<I, H>(hashed_history_id: &str, records: I, hasher: &H) -> FilteredBatch
where
    I: IntoIterator<Item = Record>,
    H: HistoryHasher + ?Sized,
{
    let mut batch = FilteredBatch::default();

    for record in records {
        match validate_record(
            &record,
            batch.history_id.as_deref(),
            hashed_history_id,
            hasher,
        ) {
            Ok(()) => {
                if batch.history_id.is_none() {
                    batch.history_id = record.history_id.clone();
                }
                batch.records.push(record);
            }
            Err(e) => {
                trace!(error = %e, "Dropping record");
                batch.dropped += 1;
            }
        }
    }

    if batch.dropped > 0 {
        debug!(
            kept = batch.records.len(),
            dropped = batch.dropped,
            "Dropped invalid records"
        );
    }

    batch
}

/// Filter `records`, returning only the valid ones in input order
pub fn filter_valid_records<I, H>(hashed_history_id: &str, records: I, hasher: &H) -> Vec<Record>
where
    I: IntoIterator<Item = Record>,
    H: HistoryHasher + ?Sized,
{
    filter_records(hashed_history_id, records, hasher).records
}
