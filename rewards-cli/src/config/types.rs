use std::time::Duration;

use rewards_core::RewardConfig;
use serde::{Deserialize, Serialize};

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawCliConfig {
    #[serde(default)]
    pub rewards: RawRewardConfig,
}

/// Reward options as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawRewardConfig {
    #[serde(default, with = "humantime_serde")]
    pub reward_window: Option<Duration>,

    pub default_reward_key: Option<String>,

    pub default_reward_value: Option<f64>,

    pub default_event_reward_value: Option<f64>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CliConfig {
    #[serde(default)]
    pub rewards: RewardConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_config_partial_parsing() {
        let toml_str = r#"
[rewards]
reward_window = "15m"
"#;
        let raw: RawCliConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(raw.rewards.reward_window, Some(Duration::from_secs(900)));
        assert!(raw.rewards.default_reward_key.is_none());
        assert!(raw.rewards.default_event_reward_value.is_none());
    }

    #[test]
    fn test_raw_config_empty_file() {
        let raw: RawCliConfig = toml::from_str("").unwrap();
        assert!(raw.rewards.reward_window.is_none());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = CliConfig::default();
        config.rewards.default_reward_key = "clicks".into();

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: CliConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed, config);
    }
}
