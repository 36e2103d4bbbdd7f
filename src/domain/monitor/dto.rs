use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::monitoring::MonitoringSummary;

/// `?format=json` 이면 JSON, 그 외에는 HTML
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FormatQuery {
    /// json | html (default html)
    pub format: Option<String>,
}

impl FormatQuery {
    pub fn is_json(&self) -> bool {
        self.format.as_deref() == Some("json")
    }
}

/// 모니터링 패스 실패 시 JSON 응답
#[derive(Debug, Serialize, ToSchema)]
pub struct MonitorErrorResponse {
    #[schema(example = "error")]
    pub status: &'static str,
    pub error: String,
    pub timestamp: String,
}

impl From<&MonitoringSummary> for MonitorErrorResponse {
    fn from(summary: &MonitoringSummary) -> Self {
        Self {
            status: "error",
            error: summary.error.clone().unwrap_or_default(),
            timestamp: summary.timestamp.clone(),
        }
    }
}

/// 테스트 알림 전송 결과
#[derive(Debug, Serialize, ToSchema)]
pub struct SendAlertResponse {
    /// success | failed
    #[schema(example = "success")]
    pub status: &'static str,
    #[schema(example = "Test alert sent")]
    pub message: &'static str,
    pub timestamp: String,
}

impl SendAlertResponse {
    pub fn new(sent: bool, timestamp: String) -> Self {
        if sent {
            Self {
                status: "success",
                message: "Test alert sent",
                timestamp,
            }
        } else {
            Self {
                status: "failed",
                message: "Failed to send test alert",
                timestamp,
            }
        }
    }
}
