//! rewards-core - Reward attribution for decision logs
//!
//! Joins asynchronously arriving rewards and events onto the decisions that
//! preceded them within a fixed reward window, producing reward-annotated
//! decisions grouped by model.
//!
//! # Key Types
//!
//! - [`Record`] - A decoded decision, rewards or event record
//! - [`filter_records`] - Drops invalid records and pins the batch history id
//! - [`ListenerWindow`] - Expires and rewards decision listeners
//! - [`RewardAssigner`] - Orders a batch and attributes its rewards

pub mod config;
pub mod error;
pub mod filter;
pub mod hash;
pub mod join;
pub mod record;
pub mod validate;
pub mod window;

pub use config::{
    DEFAULT_EVENT_REWARD_VALUE, DEFAULT_REWARD_KEY, DEFAULT_REWARD_WINDOW, RewardConfig,
};
pub use error::{JoinError, RecordError, Result};
pub use filter::{FilteredBatch, filter_records, filter_valid_records};
pub use hash::{HistoryHasher, Sha256HistoryHasher};
pub use join::{RewardAssigner, RewardedDecisions, assign_rewards};
pub use record::{Record, RecordKind, RewardedDecision, reward_value};
pub use validate::validate_record;
pub use window::{ListenerArena, ListenerId, ListenerWindow};
