//! Tickler configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, TicklerError};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TicklerConfig {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
}

impl TicklerConfig {
    /// Load config from the default path (~/.tickler/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TicklerError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| TicklerError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| TicklerError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the Tickler home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tickler")
    }
}

/// Scheduler worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between due-reminder polls.
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,
    /// Lead time (minutes) applied to implicit reminders derived from a
    /// task's due instant.
    #[serde(default = "default_lead_minutes")]
    pub default_lead_minutes: u32,
    /// Reference timezone as a fixed UTC offset, e.g. "+05:30". All stored
    /// instants are canonicalized to this zone before comparison.
    #[serde(default = "default_reference_offset")]
    pub reference_offset: String,
}

fn default_check_interval() -> u64 {
    30
}
fn default_lead_minutes() -> u32 {
    15
}
fn default_reference_offset() -> String {
    "+05:30".into()
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval(),
            default_lead_minutes: default_lead_minutes(),
            reference_offset: default_reference_offset(),
        }
    }
}

/// Notification channel configuration. A missing or disabled section
/// silently disables that channel rather than failing the worker.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChannelConfig {
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
}

/// Telegram Bot API channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TicklerConfig::default();
        assert_eq!(config.scheduler.check_interval_secs, 30);
        assert_eq!(config.scheduler.default_lead_minutes, 15);
        assert_eq!(config.scheduler.reference_offset, "+05:30");
        assert!(config.channel.telegram.is_none());
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml = r#"
            [scheduler]
            check_interval_secs = 5

            [channel.telegram]
            bot_token = "123:abc"
            chat_id = "42"
        "#;
        let config: TicklerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.scheduler.check_interval_secs, 5);
        assert_eq!(config.scheduler.default_lead_minutes, 15);
        let tg = config.channel.telegram.unwrap();
        assert!(tg.enabled);
        assert_eq!(tg.chat_id, "42");
    }
}
