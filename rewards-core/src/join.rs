//! Joins rewards and events onto the decisions that preceded them
//!
//! Records are visited in timestamp order. Decisions register a listener
//! under their reward key; `rewards` records update the listeners of each
//! key they name, `event` records update the listeners of every key seen so
//! far. Expiry is only evaluated when a reward or event arrives.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;
use tracing::debug;

use crate::config::RewardConfig;
use crate::error::{JoinError, Result};
use crate::record::{Record, RecordKind, RewardedDecision, reward_value};
use crate::window::{ListenerArena, ListenerId, ListenerWindow};

/// Annotated decisions grouped by model
pub type RewardedDecisions = BTreeMap<String, Vec<RewardedDecision>>;

/// Assigns rewards to the decisions of one batch at a time
#[derive(Debug, Clone)]
pub struct RewardAssigner {
    config: RewardConfig,
    window: ListenerWindow,
}

impl RewardAssigner {
    pub fn new(config: RewardConfig) -> Self {
        let window = ListenerWindow::from_config(&config);
        Self { config, window }
    }

    /// Attribute the rewards and events in `records` to their decisions
    ///
    /// Input records are left untouched; every decision in the output is a
    /// snapshot taken when its record was visited. Each model's list keeps
    /// the (sorted) arrival order of its decisions.
    pub fn assign_rewards(&self, records: &[Record]) -> Result<RewardedDecisions> {
        let mut ordered = records
            .iter()
            .map(|record| {
                let (timestamp, kind) = timestamp_and_kind(record)?;
                Ok((sort_key(timestamp, kind), timestamp, kind, record))
            })
            .collect::<Result<Vec<_>>>()?;
        // Stable, so records with equal keys keep their input order
        ordered.sort_by_key(|(key, ..)| *key);

        let mut arena = ListenerArena::new();
        let mut decisions_by_model: BTreeMap<String, Vec<ListenerId>> = BTreeMap::new();
        let mut listeners_by_reward_key: HashMap<String, Vec<ListenerId>> = HashMap::new();

        for (_, timestamp, kind, record) in ordered {
            match kind {
                RecordKind::Decision => {
                    let model = record
                        .model
                        .as_deref()
                        .ok_or(JoinError::MissingField("model"))?;
                    let id = arena.insert(timestamp, RewardedDecision::from_decision(record));
                    decisions_by_model
                        .entry(model.to_string())
                        .or_default()
                        .push(id);

                    let reward_key = record
                        .reward_key
                        .as_deref()
                        .unwrap_or(&self.config.default_reward_key);
                    listeners_by_reward_key
                        .entry(reward_key.to_string())
                        .or_default()
                        .push(id);
                }
                RecordKind::Rewards => {
                    let rewards = record
                        .rewards
                        .as_ref()
                        .ok_or(JoinError::MissingField("rewards"))?;
                    for (reward_key, value) in rewards {
                        let reward = numeric(value, || format!("rewards.{reward_key}"))?;
                        if let Some(listeners) = listeners_by_reward_key.get_mut(reward_key) {
                            self.window
                                .update_listeners(&mut arena, listeners, timestamp, reward)?;
                        }
                    }
                }
                RecordKind::Event => {
                    let reward = self.event_reward(record.properties.as_ref())?;
                    for listeners in listeners_by_reward_key.values_mut() {
                        self.window
                            .update_listeners(&mut arena, listeners, timestamp, reward)?;
                    }
                }
                RecordKind::Other => {}
            }
        }

        debug!(
            records = records.len(),
            decisions = arena.len(),
            models = decisions_by_model.len(),
            reward_keys = listeners_by_reward_key.len(),
            "Assigned rewards to batch"
        );

        Ok(group_by_model(arena, decisions_by_model))
    }

    fn event_reward(&self, properties: Option<&Value>) -> Result<f64> {
        match properties {
            None => Ok(self.config.default_event_reward_value),
            Some(Value::Object(props)) => match props.get("value") {
                Some(value) => numeric(value, || "properties.value".to_string()),
                None => Ok(self.config.default_event_reward_value),
            },
            Some(other) => Err(JoinError::InvalidProperties(other.clone())),
        }
    }
}

/// Attribute rewards with a one-off [`RewardAssigner`]
pub fn assign_rewards(config: &RewardConfig, records: &[Record]) -> Result<RewardedDecisions> {
    RewardAssigner::new(config.clone()).assign_rewards(records)
}

fn timestamp_and_kind(record: &Record) -> Result<(DateTime<Utc>, RecordKind)> {
    let timestamp = record
        .timestamp
        .ok_or(JoinError::MissingField("timestamp"))?;
    let kind = record.kind.ok_or(JoinError::MissingField("type"))?;
    Ok((timestamp, kind))
}

/// Decisions sort 1µs early so they precede a reward with the same timestamp
fn sort_key(timestamp: DateTime<Utc>, kind: RecordKind) -> DateTime<Utc> {
    if kind == RecordKind::Decision {
        timestamp
            .checked_sub_signed(TimeDelta::microseconds(1))
            .unwrap_or(timestamp)
    } else {
        timestamp
    }
}

fn numeric(value: &Value, field: impl FnOnce() -> String) -> Result<f64> {
    reward_value(value).ok_or_else(|| JoinError::NonNumericReward {
        field: field(),
        value: value.clone(),
    })
}

fn group_by_model(
    arena: ListenerArena,
    decisions_by_model: BTreeMap<String, Vec<ListenerId>>,
) -> RewardedDecisions {
    let mut slots: Vec<Option<RewardedDecision>> =
        arena.into_decisions().into_iter().map(Some).collect();

    decisions_by_model
        .into_iter()
        .map(|(model, ids)| {
            let decisions = ids
                .into_iter()
                .filter_map(|id| slots.get_mut(id.index()).and_then(Option::take))
                .collect();
            (model, decisions)
        })
        .collect()
}
