//! Pub/Sub push subscription payloads

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::notification::NotifyOutcome;

/// Push envelope posted by a Pub/Sub push subscription
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PubSubPushEnvelope {
    pub message: PubSubMessage,
    /// projects/{project}/subscriptions/{name}
    pub subscription: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PubSubMessage {
    /// base64 encoded JSON event
    #[serde(default)]
    pub data: String,
    pub message_id: Option<String>,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

/// Always 200 so Pub/Sub does not redeliver
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotifyResponse {
    pub outcome: NotifyOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_parse_push_envelope() {
        // Arrange
        let body = json!({
            "message": {
                "data": "eyJpZCI6ICIxIn0=",
                "messageId": "136969346945",
                "attributes": {"buildId": "b1"}
            },
            "subscription": "projects/lunette/subscriptions/notify-push"
        });

        // Act
        let envelope: PubSubPushEnvelope = serde_json::from_value(body).unwrap();

        // Assert
        assert_eq!(envelope.message.data, "eyJpZCI6ICIxIn0=");
        assert_eq!(envelope.message.message_id.as_deref(), Some("136969346945"));
        assert_eq!(envelope.message.attributes["buildId"], "b1");
    }

    #[test]
    fn should_reject_envelope_without_message() {
        let result = serde_json::from_value::<PubSubPushEnvelope>(json!({"subscription": "s"}));

        assert!(result.is_err());
    }

    #[test]
    fn should_serialize_response_in_camel_case() {
        let response = NotifyResponse {
            outcome: NotifyOutcome::Sent,
            message_id: Some("42".to_string()),
        };

        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json, json!({"outcome": "sent", "messageId": "42"}));
    }
}
