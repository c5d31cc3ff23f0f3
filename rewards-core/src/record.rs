//! Record types consumed and produced by the join
//!
//! A [`Record`] is a decoded field mapping. The fields the validator and the
//! join look at are typed and optional so that absence can be detected;
//! everything else is carried verbatim in [`Record::extra`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{JoinError, Result};

/// Kind of a record, taken from its `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// A model selected an action
    Decision,
    /// Reward values keyed by reward key
    Rewards,
    /// A business event, broadcast to every reward key
    Event,
    /// Any other type string; ignored by the join
    #[serde(other)]
    Other,
}

/// A single decoded record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<RecordKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_key: Option<String>,

    /// Reward values for `rewards` records, keyed by reward key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewards: Option<Map<String, Value>>,

    /// Event properties; `properties.value` is the event's reward
    ///
    /// Kept as a raw value so that a present but non-object `properties`
    /// (including `null`) reaches the join instead of failing decoding.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub properties: Option<Value>,

    /// Fields the join does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    /// Create a decision record for `model`
    pub fn decision(model: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp: Some(timestamp),
            kind: Some(RecordKind::Decision),
            model: Some(model.into()),
            ..Default::default()
        }
    }

    /// Create a rewards record from `(reward_key, value)` pairs
    pub fn rewards<K, V>(timestamp: DateTime<Utc>, rewards: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            timestamp: Some(timestamp),
            kind: Some(RecordKind::Rewards),
            rewards: Some(
                rewards
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            ..Default::default()
        }
    }

    /// Create an event record, optionally carrying `properties.value`
    pub fn event(timestamp: DateTime<Utc>, value: Option<f64>) -> Self {
        let properties = value.map(|v| {
            let mut props = Map::new();
            props.insert("value".into(), Value::from(v));
            Value::Object(props)
        });
        Self {
            timestamp: Some(timestamp),
            kind: Some(RecordKind::Event),
            properties,
            ..Default::default()
        }
    }

    pub fn with_reward_key(mut self, reward_key: impl Into<String>) -> Self {
        self.reward_key = Some(reward_key.into());
        self
    }

    pub fn with_history_id(mut self, history_id: impl Into<String>) -> Self {
        self.history_id = Some(history_id.into());
        self
    }
}

/// Deserialize a field that is present, even when it is `null`
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// A decision snapshot annotated with the rewards attributed to it
///
/// `reward` stays `None` until the first reward or event reaches the
/// decision, and is omitted from the serialized form while absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardedDecision {
    #[serde(flatten)]
    pub decision: Record,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<f64>,
}

impl RewardedDecision {
    /// Snapshot a decision record
    ///
    /// A numeric `reward` already present on the record becomes the starting
    /// value of the accumulator. Any other `reward` value is left in place
    /// untouched until a reward tries to add to it.
    pub fn from_decision(record: &Record) -> Self {
        let mut decision = record.clone();
        let reward = decision.extra.get("reward").and_then(reward_value);
        if reward.is_some() {
            decision.extra.remove("reward");
        }
        Self { decision, reward }
    }

    /// Add `reward` to the accumulator, starting from `base` on first contribution
    ///
    /// Fails when the decision carried a non-numeric `reward` of its own.
    pub fn add_reward(&mut self, reward: f64, base: f64) -> Result<()> {
        if self.reward.is_none()
            && let Some(existing) = self.decision.extra.get("reward")
        {
            return Err(JoinError::NonNumericReward {
                field: "reward".into(),
                value: existing.clone(),
            });
        }
        self.reward = Some(self.reward.unwrap_or(base) + reward);
        Ok(())
    }
}

/// Coerce a raw reward value to `f64`
///
/// Numbers and booleans (`true` = 1, `false` = 0) are numeric, anything else
/// yields `None`.
pub fn reward_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}
