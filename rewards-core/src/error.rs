//! Error types for rewards-core

use serde_json::Value;
use thiserror::Error;

/// Reason a record was rejected by the validator
///
/// The filter treats both variants the same way: the record is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecordError {
    /// A required field is absent
    #[error("invalid record")]
    InvalidRecord,

    /// History id differs from the batch id or does not hash to the expected value
    #[error("history_id hash mismatch")]
    HistoryMismatch,
}

/// Error raised when the join is handed input it cannot interpret
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JoinError {
    /// A field the join reads unconditionally is absent
    #[error("record is missing required field `{0}`")]
    MissingField(&'static str),

    /// An event whose `properties` is present but not an object
    #[error("event properties is not an object: {0}")]
    InvalidProperties(Value),

    /// A reward value that is neither a number nor a boolean
    #[error("reward at `{field}` is not numeric: {value}")]
    NonNumericReward { field: String, value: Value },
}

/// Result type alias for join operations
pub type Result<T> = std::result::Result<T, JoinError>;
