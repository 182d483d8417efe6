//! Notification dispatch — delivers a due-reminder event to an ordered set
//! of channels. Each channel failure is caught, logged, and never affects
//! the other channels or the worker loop.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

use tickler_core::config::ChannelConfig;
use tickler_core::error::{Result, TicklerError};

/// A notification to deliver for a due reminder.
#[derive(Debug, Clone)]
pub struct Notification {
    /// Task title (or synthetic fallback label).
    pub title: String,
    /// Human-readable body, includes the original remind_at.
    pub body: String,
    pub timestamp: DateTime<FixedOffset>,
}

impl Notification {
    pub fn new(title: &str, body: &str, timestamp: DateTime<FixedOffset>) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
            timestamp,
        }
    }
}

/// An independent notification delivery mechanism.
#[async_trait]
pub trait NotifyChannel: Send + Sync {
    fn name(&self) -> &str;
    async fn send(&self, notification: &Notification) -> Result<()>;
}

/// Local log channel — always configured, always first.
pub struct ConsoleChannel;

#[async_trait]
impl NotifyChannel for ConsoleChannel {
    fn name(&self) -> &str {
        "console"
    }

    async fn send(&self, notification: &Notification) -> Result<()> {
        tracing::info!(
            "🔔 [{}] {}",
            notification.timestamp.format("%Y-%m-%d %H:%M:%S"),
            notification.body
        );
        Ok(())
    }
}

/// Remote push channel via the Telegram Bot API `sendMessage`.
pub struct TelegramChannel {
    bot_token: String,
    chat_id: String,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(bot_token: &str, chat_id: &str) -> Self {
        Self {
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl NotifyChannel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, notification: &Notification) -> Result<()> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);
        let text = format!(
            "📌 *{}*\n\n{}",
            escape_markdown(&notification.title),
            escape_markdown(&notification.body)
        );

        let resp = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "chat_id": self.chat_id,
                "text": text,
                "parse_mode": "Markdown",
            }))
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| TicklerError::Channel(format!("Telegram send failed: {e}")))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            Err(TicklerError::Channel(format!(
                "Telegram API error {status}: {body}"
            )))
        }
    }
}

/// Escape Telegram MarkdownV1 special characters.
fn escape_markdown(s: &str) -> String {
    s.replace('_', "\\_")
        .replace('*', "\\*")
        .replace('[', "\\[")
        .replace('`', "\\`")
}

/// Fixed, ordered set of channels for a process.
pub struct Dispatcher {
    channels: Vec<Box<dyn NotifyChannel>>,
}

impl Dispatcher {
    /// Console channel plus whatever remote channels the config enables.
    /// Absent credentials silently disable a channel rather than failing.
    pub fn from_config(config: &ChannelConfig) -> Self {
        let mut dispatcher = Self::new().with_channel(Box::new(ConsoleChannel));
        if let Some(tg) = &config.telegram
            && tg.enabled
            && !tg.bot_token.is_empty()
            && !tg.chat_id.is_empty()
        {
            dispatcher = dispatcher.with_channel(Box::new(TelegramChannel::new(
                &tg.bot_token,
                &tg.chat_id,
            )));
        }
        dispatcher
    }

    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
        }
    }

    pub fn with_channel(mut self, channel: Box<dyn NotifyChannel>) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    /// Deliver to every channel in order. Failures are logged per channel;
    /// the caller gets the outcomes but is free to ignore them — the worker
    /// retires the reminder regardless.
    pub async fn dispatch(&self, notification: &Notification) -> Vec<(String, Result<()>)> {
        let mut outcomes = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            let outcome = channel.send(notification).await;
            if let Err(e) = &outcome {
                tracing::warn!("⚠️ Channel '{}' delivery failed: {e}", channel.name());
            }
            outcomes.push((channel.name().to_string(), outcome));
        }
        outcomes
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickler_core::config::TelegramConfig;

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("a_b *c* [d] `e`"), "a\\_b \\*c\\* \\[d] \\`e\\`");
    }

    #[test]
    fn test_from_config_console_only() {
        let dispatcher = Dispatcher::from_config(&ChannelConfig::default());
        assert_eq!(dispatcher.channel_names(), vec!["console"]);
    }

    #[test]
    fn test_from_config_with_telegram() {
        let config = ChannelConfig {
            telegram: Some(TelegramConfig {
                bot_token: "123:abc".into(),
                chat_id: "42".into(),
                enabled: true,
            }),
        };
        let dispatcher = Dispatcher::from_config(&config);
        assert_eq!(dispatcher.channel_names(), vec!["console", "telegram"]);
    }

    #[test]
    fn test_missing_credentials_disable_telegram() {
        let config = ChannelConfig {
            telegram: Some(TelegramConfig {
                bot_token: String::new(),
                chat_id: "42".into(),
                enabled: true,
            }),
        };
        let dispatcher = Dispatcher::from_config(&config);
        assert_eq!(dispatcher.channel_names(), vec!["console"]);
    }
}
