//! Per-record validation

use crate::error::RecordError;
use crate::hash::HistoryHasher;
use crate::record::{Record, RecordKind};

/// Check a single record against the batch's history id
///
/// `history_id` is the id already established for the batch, if any (an
/// empty string counts as not established). Without one, the record's own
/// id must hash to `hashed_history_id`.
pub fn validate_record<H>(
    record: &Record,
    history_id: Option<&str>,
    hashed_history_id: &str,
    hasher: &H,
) -> Result<(), RecordError>
where
    H: HistoryHasher + ?Sized,
{
    let (Some(_), Some(kind), Some(record_history_id)) = (
        record.timestamp,
        record.kind,
        record.history_id.as_deref(),
    ) else {
        return Err(RecordError::InvalidRecord);
    };
    if kind == RecordKind::Decision && record.model.is_none() {
        return Err(RecordError::InvalidRecord);
    }

    match history_id.filter(|id| !id.is_empty()) {
        Some(established) if established != record_history_id => Err(RecordError::HistoryMismatch),
        Some(_) => Ok(()),
        None if hasher.hash_history_id(record_history_id) != hashed_history_id => {
            Err(RecordError::HistoryMismatch)
        }
        None => Ok(()),
    }
}
