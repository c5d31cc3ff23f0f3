use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use rewards_core::RewardConfig;
use tracing::debug;

use super::types::{CliConfig, RawCliConfig, RawRewardConfig};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project + explicit file + environment)
    pub fn load(explicit: Option<&Path>) -> Result<CliConfig> {
        let mut paths = Vec::new();
        if let Some(user_path) = Self::user_config_path() {
            paths.push(user_path);
        }
        paths.push(Self::project_config_path());

        let mut raw = Self::load_files(&paths)?;

        if let Some(path) = explicit {
            let explicit = Self::load_file(path)?;
            raw = Self::merge_raw(raw, explicit);
        }

        let env = Self::env_layer(|key| std::env::var(key).ok())?;
        raw = Self::merge_raw(raw, env);

        Ok(Self::finalize(raw))
    }

    /// Get user config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "rewards").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get project config path
    /// Can be overridden with REWARDS_PROJECT_CONFIG_DIR env var
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("REWARDS_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".rewards/config.toml")
        }
    }

    /// Merge the files that exist, later paths overriding earlier ones
    fn load_files(paths: &[PathBuf]) -> Result<RawCliConfig> {
        let mut raw = RawCliConfig::default();
        for path in paths.iter().filter(|p| p.exists()) {
            let layer = Self::load_file(path)?;
            raw = Self::merge_raw(raw, layer);
        }
        Ok(raw)
    }

    fn load_file(path: &Path) -> Result<RawCliConfig> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let raw = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        debug!(path = %path.display(), "Loaded config layer");
        Ok(raw)
    }

    /// Read `REWARDS_*` overrides through `lookup`
    fn env_layer(lookup: impl Fn(&str) -> Option<String>) -> Result<RawCliConfig> {
        let reward_window = lookup("REWARDS_REWARD_WINDOW")
            .map(|v| parse_window(&v))
            .transpose()
            .context("Invalid REWARDS_REWARD_WINDOW")?;
        let default_reward_value = lookup("REWARDS_DEFAULT_REWARD_VALUE")
            .map(|v| v.parse::<f64>())
            .transpose()
            .context("Invalid REWARDS_DEFAULT_REWARD_VALUE")?;
        let default_event_reward_value = lookup("REWARDS_DEFAULT_EVENT_REWARD_VALUE")
            .map(|v| v.parse::<f64>())
            .transpose()
            .context("Invalid REWARDS_DEFAULT_EVENT_REWARD_VALUE")?;

        Ok(RawCliConfig {
            rewards: RawRewardConfig {
                reward_window,
                default_reward_key: lookup("REWARDS_DEFAULT_REWARD_KEY"),
                default_reward_value,
                default_event_reward_value,
            },
        })
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawCliConfig, overlay: RawCliConfig) -> RawCliConfig {
        RawCliConfig {
            rewards: RawRewardConfig {
                reward_window: overlay.rewards.reward_window.or(base.rewards.reward_window),
                default_reward_key: overlay
                    .rewards
                    .default_reward_key
                    .or(base.rewards.default_reward_key),
                default_reward_value: overlay
                    .rewards
                    .default_reward_value
                    .or(base.rewards.default_reward_value),
                default_event_reward_value: overlay
                    .rewards
                    .default_event_reward_value
                    .or(base.rewards.default_event_reward_value),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawCliConfig) -> CliConfig {
        let defaults = RewardConfig::default();
        CliConfig {
            rewards: RewardConfig {
                reward_window: raw.rewards.reward_window.unwrap_or(defaults.reward_window),
                default_reward_key: raw
                    .rewards
                    .default_reward_key
                    .unwrap_or(defaults.default_reward_key),
                default_reward_value: raw
                    .rewards
                    .default_reward_value
                    .unwrap_or(defaults.default_reward_value),
                default_event_reward_value: raw
                    .rewards
                    .default_event_reward_value
                    .unwrap_or(defaults.default_event_reward_value),
            },
        }
    }
}

/// Parse a reward window such as `"90s"` or `"2h 30m"`
pub fn parse_window(value: &str) -> Result<Duration, humantime::DurationError> {
    humantime::parse_duration(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_missing_files_give_defaults() {
        let dir = TempDir::new().unwrap();
        let raw = ConfigLoader::load_files(&[dir.path().join("absent.toml")]).unwrap();
        assert_eq!(ConfigLoader::finalize(raw), CliConfig::default());
    }

    #[test]
    fn test_later_layer_overrides_earlier() {
        let dir = TempDir::new().unwrap();
        let user = write(
            &dir,
            "user.toml",
            "[rewards]\nreward_window = \"1h\"\ndefault_reward_key = \"clicks\"\n",
        );
        let project = write(&dir, "project.toml", "[rewards]\nreward_window = \"5m\"\n");

        let config = ConfigLoader::finalize(ConfigLoader::load_files(&[user, project]).unwrap());

        assert_eq!(config.rewards.reward_window, Duration::from_secs(300));
        assert_eq!(config.rewards.default_reward_key, "clicks");
        assert_eq!(config.rewards.default_reward_value, 0.0);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.toml", "[rewards]\nreward_window = \"soon\"\n");

        let err = ConfigLoader::load_files(&[path]).unwrap_err();

        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_env_layer() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("REWARDS_REWARD_WINDOW", "90s"),
            ("REWARDS_DEFAULT_EVENT_REWARD_VALUE", "0.5"),
        ]);

        let raw = ConfigLoader::env_layer(|key| env.get(key).map(|v| v.to_string())).unwrap();
        let config = ConfigLoader::finalize(raw);

        assert_eq!(config.rewards.reward_window, Duration::from_secs(90));
        assert_eq!(config.rewards.default_event_reward_value, 0.5);
        assert_eq!(config.rewards.default_reward_key, "reward");
    }

    #[test]
    fn test_env_layer_rejects_bad_numbers() {
        let err = ConfigLoader::env_layer(|key| {
            (key == "REWARDS_DEFAULT_REWARD_VALUE").then(|| "lots".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("REWARDS_DEFAULT_REWARD_VALUE"));
    }

    #[test]
    fn test_parse_window() {
        assert_eq!(parse_window("2h").unwrap(), Duration::from_secs(7200));
        assert!(parse_window("later").is_err());
    }
}
