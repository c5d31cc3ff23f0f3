//! History id hashing
//!
//! The filter never hashes ids itself; it is handed a [`HistoryHasher`].

use sha2::{Digest, Sha256};

/// One-way hash applied to a raw history id
pub trait HistoryHasher {
    fn hash_history_id(&self, history_id: &str) -> String;
}

impl<F> HistoryHasher for F
where
    F: Fn(&str) -> String,
{
    fn hash_history_id(&self, history_id: &str) -> String {
        self(history_id)
    }
}

/// Lowercase hex SHA-256 of the history id
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256HistoryHasher;

impl HistoryHasher for Sha256HistoryHasher {
    fn hash_history_id(&self, history_id: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(history_id.as_bytes());
        hex::encode(hasher.finalize())
    }
}
