//! Outbound notification transports.

use anyhow::{anyhow, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

const TELEGRAM_API: &str = "https://api.telegram.org";

/// Delivers a plain-text message to one chat.
pub trait Notifier: Send + Sync {
    fn send(&self, chat_id: &str, text: &str) -> Result<()>;
}

/// Telegram Bot API `sendMessage`.
pub struct TelegramNotifier {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str) -> Result<Self> {
        Self::with_api_base(TELEGRAM_API, bot_token)
    }

    pub fn with_api_base(api_base: &str, bot_token: &str) -> Result<Self> {
        if bot_token.trim().is_empty() {
            return Err(anyhow!("Telegram bot token is empty"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("vosscrm/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_base.trim_end_matches('/'), bot_token.trim()),
        })
    }
}

impl Notifier for TelegramNotifier {
    fn send(&self, chat_id: &str, text: &str) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/sendMessage", self.base_url))
            .json(&SendMessage { chat_id, text })
            .send()
            .map_err(|e| anyhow!("Telegram request failed: {}", e.without_url()))?;

        let status = response.status();
        let body: TelegramResponse = response
            .json()
            .map_err(|_| anyhow!("Telegram returned HTTP {}", status.as_u16()))?;

        if !body.ok {
            return Err(anyhow!(
                "Telegram rejected message: {}",
                body.description.unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
            ));
        }
        Ok(())
    }
}

/// Writes messages to the log instead of sending them.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, chat_id: &str, text: &str) -> Result<()> {
        info!(chat_id, text, "notification (not sent)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_message_body() {
        let json = serde_json::to_string(&SendMessage {
            chat_id: "42",
            text: "hi",
        })
        .unwrap();
        assert_eq!(json, r#"{"chat_id":"42","text":"hi"}"#);
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(TelegramNotifier::new("  ").is_err());
    }

    #[test]
    fn test_token_goes_into_path() {
        let n = TelegramNotifier::with_api_base("http://localhost:9/", "abc").unwrap();
        assert_eq!(n.base_url, "http://localhost:9/botabc");
    }

    #[test]
    fn test_log_notifier_never_fails() {
        assert!(LogNotifier.send("1", "hello").is_ok());
    }
}
