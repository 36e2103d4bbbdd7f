//! Telegram alert channel
//!
//! Sends text messages to a fixed chat through the Bot API `sendMessage`
//! method. Delivery is attempted once; callers decide what a failure means.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, info, instrument};

use crate::config::{app_config::DEFAULT_TELEGRAM_API_BASE, MonitorConfig};
use crate::utils::AppError;

/// Telegram 호출 타임아웃 (초)
pub const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Telegram text formatting mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseMode {
    /// Monitoring alerts
    #[serde(rename = "HTML")]
    Html,
    /// Build and invoice notifications
    Markdown,
}

/// Bot API sendMessage payload
#[derive(Debug, Serialize)]
pub struct TelegramMessage<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
    pub parse_mode: ParseMode,
    pub disable_web_page_preview: bool,
}

/// 알림 채널 인터페이스
///
/// 테스트에서 Mock 객체로 대체할 수 있습니다.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AlertChannel: Send + Sync {
    /// Send one message. Never retries.
    async fn send(&self, text: &str, parse_mode: ParseMode) -> Result<(), AppError>;
}

/// Telegram alert service
#[derive(Debug, Clone)]
pub struct TelegramAlert {
    api_base: String,
    bot_token: String,
    chat_id: String,
    client: Client,
    enabled: bool,
}

impl TelegramAlert {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            client: Client::new(),
            enabled: true,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Channel for the resolved credentials, disabled when either is missing
    pub fn from_config(config: &MonitorConfig) -> Self {
        match config.telegram_credentials() {
            Some((token, chat_id)) => {
                Self::new(token, chat_id).with_api_base(config.telegram_api_base.clone())
            }
            None => Self::disabled(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
            bot_token: String::new(),
            chat_id: String::new(),
            client: Client::new(),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && !self.bot_token.is_empty() && !self.chat_id.is_empty()
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.bot_token
        )
    }
}

#[async_trait]
impl AlertChannel for TelegramAlert {
    #[instrument(skip(self, text), fields(chat_id = %self.chat_id, len = text.len()))]
    async fn send(&self, text: &str, parse_mode: ParseMode) -> Result<(), AppError> {
        if !self.is_enabled() {
            debug!("Telegram credentials not configured, skipping");
            return Err(AppError::configuration(
                "Telegram credentials not configured",
            ));
        }

        let payload = TelegramMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode,
            disable_web_page_preview: true,
        };

        let response = self
            .client
            .post(self.send_message_url())
            .timeout(SEND_TIMEOUT)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send Telegram alert");
                AppError::channel(format!("Failed to send Telegram alert: {}", e))
            })?;

        if response.status() != reqwest::StatusCode::OK {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Telegram API returned error");
            return Err(AppError::channel(format!(
                "Telegram API error: {} - {}",
                status, body
            )));
        }

        info!("Telegram alert sent successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn should_create_disabled_alert_without_credentials() {
        // Arrange
        let config = MonitorConfig {
            bot_token: Some("token".to_string()),
            ..Default::default()
        };

        // Act
        let alert = TelegramAlert::from_config(&config);

        // Assert
        assert!(!alert.is_enabled());
    }

    #[test]
    fn should_create_enabled_alert_from_config() {
        let config = MonitorConfig {
            bot_token: Some("token".to_string()),
            chat_id: Some("-100123".to_string()),
            telegram_api_base: "http://localhost:9999".to_string(),
            ..Default::default()
        };

        let alert = TelegramAlert::from_config(&config);

        assert!(alert.is_enabled());
        assert_eq!(
            alert.send_message_url(),
            "http://localhost:9999/bottoken/sendMessage"
        );
    }

    #[test]
    fn should_serialize_message_with_parse_mode() {
        let message = TelegramMessage {
            chat_id: "42",
            text: "<b>hi</b>",
            parse_mode: ParseMode::Html,
            disable_web_page_preview: true,
        };

        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["chat_id"], "42");
        assert_eq!(json["parse_mode"], "HTML");
        assert_eq!(json["disable_web_page_preview"], true);
        assert_eq!(
            serde_json::to_value(ParseMode::Markdown).unwrap(),
            "Markdown"
        );
    }

    #[tokio::test]
    async fn should_fail_with_configuration_error_when_disabled() {
        let alert = TelegramAlert::disabled();

        let result = alert.send("test", ParseMode::Html).await;

        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[tokio::test]
    async fn should_post_message_to_bot_api() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botabc/sendMessage"))
            .and(body_json(serde_json::json!({
                "chat_id": "42",
                "text": "hello",
                "parse_mode": "HTML",
                "disable_web_page_preview": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let alert = TelegramAlert::new("abc", "42").with_api_base(server.uri());

        // Act
        let result = alert.send("hello", ParseMode::Html).await;

        // Assert
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn should_return_channel_error_on_non_200() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("chat not found"))
            .mount(&server)
            .await;

        let alert = TelegramAlert::new("abc", "42").with_api_base(server.uri());

        let result = alert.send("hello", ParseMode::Markdown).await;

        match result {
            Err(AppError::Channel(msg)) => assert!(msg.contains("chat not found")),
            other => panic!("Expected Channel error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn should_fail_with_invalid_api_base() {
        let alert = TelegramAlert::new("abc", "42").with_api_base("invalid-url");

        let result = alert.send("hello", ParseMode::Html).await;

        assert!(matches!(result, Err(AppError::Channel(_))));
    }
}
