use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;

use super::event::{classify, decode_payload, NotificationEvent};
use super::message::{build_message, invoice_message};
use crate::config::MonitorConfig;
use crate::monitoring::{AlertChannel, ParseMode, TelegramAlert};

/// 이벤트 처리 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotifyOutcome {
    /// Message delivered
    Sent,
    /// Build event with a non-final status
    Ignored,
    /// Neither build nor invoice shape
    Unrecognized,
    /// Decode failure or delivery failure
    Failed,
    /// Telegram credentials missing, event dropped
    NotConfigured,
}

/// Push-model event handler
///
/// Every failure is absorbed into the returned [`NotifyOutcome`].
pub struct EventNotifier {
    channel: Option<Arc<dyn AlertChannel>>,
}

impl EventNotifier {
    pub fn new(channel: Arc<dyn AlertChannel>) -> Self {
        Self {
            channel: Some(channel),
        }
    }

    pub fn unconfigured() -> Self {
        Self { channel: None }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        match config.telegram_credentials() {
            Some(_) => Self::new(Arc::new(TelegramAlert::from_config(config))),
            None => Self::unconfigured(),
        }
    }

    /// Handles one base64 payload
    #[instrument(skip(self, data), fields(len = data.len()))]
    pub async fn handle(&self, data: &str) -> NotifyOutcome {
        let Some(channel) = self.channel.as_ref() else {
            warn!("Missing BOT_TOKEN or CHAT_ID, dropping event");
            return NotifyOutcome::NotConfigured;
        };

        let document = match decode_payload(data) {
            Ok(document) => document,
            Err(e) => {
                error!(error = %e, raw = %data, "Error processing notification payload");
                return NotifyOutcome::Failed;
            }
        };

        let event = classify(&document);
        let message = match &event {
            NotificationEvent::Build(build) => match build_message(build) {
                Some(message) => message,
                None => {
                    info!(status = %build.status, build_id = %build.build_id, "Ignoring build status");
                    return NotifyOutcome::Ignored;
                }
            },
            NotificationEvent::Invoice(invoice) => invoice_message(invoice),
            NotificationEvent::Unrecognized => {
                let payload = Value::Object(document);
                warn!(payload = %payload, "Unknown event type");
                return NotifyOutcome::Unrecognized;
            }
        };

        match channel.send(&message, ParseMode::Markdown).await {
            Ok(()) => {
                info!(kind = event.kind(), "Notification sent");
                NotifyOutcome::Sent
            }
            Err(e) => {
                error!(kind = event.kind(), error = %e, "Failed to send notification");
                NotifyOutcome::Failed
            }
        }
    }
}
