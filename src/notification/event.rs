//! Inbound event payloads
//!
//! Pub/Sub delivers `base64(json)`. The JSON document is classified by the keys
//! it carries, not by a type tag.

use base64::{engine::general_purpose, Engine as _};
use serde_json::{Map, Value};

use crate::utils::AppError;

/// Build statuses that end a build
pub const FINAL_BUILD_STATUSES: [&str; 4] = ["SUCCESS", "FAILURE", "TIMEOUT", "CANCELLED"];

pub const DEFAULT_INVOICE_EVENT_TYPE: &str = "invoice_creation";
pub const DEFAULT_CURRENCY: &str = "EUR";
pub const UNKNOWN: &str = "Unknown";

/// Cloud Build status notification
#[derive(Debug, Clone, PartialEq)]
pub struct BuildEvent {
    pub status: String,
    pub project_id: String,
    pub build_id: String,
    pub repo_name: String,
    pub branch: String,
}

impl BuildEvent {
    pub fn is_final(&self) -> bool {
        FINAL_BUILD_STATUSES.contains(&self.status.as_str())
    }

    pub fn is_success(&self) -> bool {
        self.status == "SUCCESS"
    }
}

/// Invoice lifecycle notification
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceEvent {
    pub event_type: String,
    pub status: Option<String>,
    pub invoice_id: Option<String>,
    pub external_order_id: Option<String>,
    pub customer_name: String,
    pub amount: Option<String>,
    pub currency: String,
    pub error_message: Option<String>,
}

/// Which invoice template family applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceStage {
    Creation,
    Completion,
    Other,
}

/// Outcome reported by the invoicing worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceOutcome {
    Success,
    Failure,
    Other,
}

impl InvoiceEvent {
    pub fn stage(&self) -> InvoiceStage {
        match self.event_type.as_str() {
            "invoice_creation" => InvoiceStage::Creation,
            "invoice_completion" => InvoiceStage::Completion,
            _ => InvoiceStage::Other,
        }
    }

    pub fn outcome(&self) -> InvoiceOutcome {
        match self.status.as_deref() {
            Some("success") => InvoiceOutcome::Success,
            Some("failure") => InvoiceOutcome::Failure,
            _ => InvoiceOutcome::Other,
        }
    }
}

/// Classified payload
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    Build(BuildEvent),
    Invoice(InvoiceEvent),
    Unrecognized,
}

impl NotificationEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            NotificationEvent::Build(_) => "build",
            NotificationEvent::Invoice(_) => "invoice",
            NotificationEvent::Unrecognized => "unrecognized",
        }
    }
}

/// base64 → UTF-8 → JSON object
pub fn decode_payload(data: &str) -> Result<Map<String, Value>, AppError> {
    let bytes = general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|e| AppError::decode(format!("Invalid base64 payload: {}", e)))?;

    let text = String::from_utf8(bytes)
        .map_err(|e| AppError::decode(format!("Payload is not UTF-8: {}", e)))?;

    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(AppError::decode(format!(
            "Payload is not a JSON object: {}",
            other
        ))),
        Err(e) => Err(AppError::decode(format!("Invalid JSON payload: {}", e))),
    }
}

/// 키 존재 여부로 이벤트 종류를 판별합니다.
///
/// Build is checked before invoice, so a document carrying both key sets is a
/// build event.
pub fn classify(document: &Map<String, Value>) -> NotificationEvent {
    let has = |key: &str| document.contains_key(key);

    if has("projectId") && has("status") && has("id") {
        return NotificationEvent::Build(parse_build(document));
    }

    if has("event_type") || has("invoice_id") {
        return NotificationEvent::Invoice(parse_invoice(document));
    }

    NotificationEvent::Unrecognized
}

fn parse_build(document: &Map<String, Value>) -> BuildEvent {
    let substitution = |key: &str| {
        document
            .get("substitutions")
            .and_then(|subs| subs.get(key))
            .and_then(field_text)
            .unwrap_or_else(|| UNKNOWN.to_string())
    };

    BuildEvent {
        status: text_or_empty(document, "status"),
        project_id: text_or_empty(document, "projectId"),
        build_id: text_or_empty(document, "id"),
        repo_name: substitution("REPO_NAME"),
        branch: substitution("BRANCH_NAME"),
    }
}

fn parse_invoice(document: &Map<String, Value>) -> InvoiceEvent {
    let text = |key: &str| document.get(key).and_then(field_text);

    InvoiceEvent {
        event_type: text("event_type").unwrap_or_else(|| DEFAULT_INVOICE_EVENT_TYPE.to_string()),
        status: text("status"),
        invoice_id: text("invoice_id"),
        external_order_id: text("external_order_id"),
        customer_name: text("customer_name").unwrap_or_else(|| UNKNOWN.to_string()),
        amount: text("amount"),
        currency: text("currency").unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        error_message: text("error_message").filter(|e| !e.is_empty()),
    }
}

fn text_or_empty(document: &Map<String, Value>, key: &str) -> String {
    document.get(key).and_then(field_text).unwrap_or_default()
}

/// Scalar as display text; `null` counts as absent
fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
