//! Configuration for reward assignment.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Reward key used by decisions that do not carry one
pub const DEFAULT_REWARD_KEY: &str = "reward";

/// Default reward window (2 hours)
pub const DEFAULT_REWARD_WINDOW: Duration = Duration::from_secs(2 * 60 * 60);

/// Default value of an event record without `properties.value`
pub const DEFAULT_EVENT_REWARD_VALUE: f64 = 0.001;

/// Options recognized by the join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Maximum gap between a decision and a reward that still counts.
    #[serde(default = "default_reward_window", with = "humantime_serde")]
    pub reward_window: Duration,

    /// Reward key for decisions without an explicit `reward_key`.
    #[serde(default = "default_reward_key")]
    pub default_reward_key: String,

    /// Base value a listener starts from when it receives its first reward.
    #[serde(default)]
    pub default_reward_value: f64,

    /// Reward broadcast by an event record lacking `properties.value`.
    #[serde(default = "default_event_reward_value")]
    pub default_event_reward_value: f64,
}

fn default_reward_window() -> Duration {
    DEFAULT_REWARD_WINDOW
}

fn default_reward_key() -> String {
    DEFAULT_REWARD_KEY.to_string()
}

fn default_event_reward_value() -> f64 {
    DEFAULT_EVENT_REWARD_VALUE
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            reward_window: default_reward_window(),
            default_reward_key: default_reward_key(),
            default_reward_value: 0.0,
            default_event_reward_value: default_event_reward_value(),
        }
    }
}

impl RewardConfig {
    /// Set the reward window
    pub fn with_reward_window(mut self, window: Duration) -> Self {
        self.reward_window = window;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RewardConfig::default();
        assert_eq!(config.reward_window, Duration::from_secs(7200));
        assert_eq!(config.default_reward_key, "reward");
        assert_eq!(config.default_reward_value, 0.0);
        assert!((config.default_event_reward_value - 0.001).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: RewardConfig = toml::from_str(r#"reward_window = "30m""#).unwrap();
        assert_eq!(config.reward_window, Duration::from_secs(1800));
        assert_eq!(config.default_reward_key, DEFAULT_REWARD_KEY);
    }

    #[test]
    fn test_config_serialization() {
        let config = RewardConfig {
            reward_window: Duration::from_secs(90),
            default_reward_key: "clicks".into(),
            default_reward_value: 1.5,
            default_event_reward_value: 0.25,
        };
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("1m 30s"));
        let parsed: RewardConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_with_reward_window() {
        let config = RewardConfig::default().with_reward_window(Duration::from_secs(60));
        assert_eq!(config.reward_window, Duration::from_secs(60));
    }
}
