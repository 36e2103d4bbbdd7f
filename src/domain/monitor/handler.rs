use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::{error, info};

use super::dashboard::{render_dashboard, render_send_alert_redirect};
use super::dto::{FormatQuery, MonitorErrorResponse, SendAlertResponse};
use crate::monitoring::formatter::format_test_alert;
use crate::monitoring::{AlertChannel, Monitor, MonitoringSummary, ParseMode, TelegramAlert};
use crate::AppState;

/// 모니터링 패스 실행
///
/// 멈춘 주문과 워커 상태를 확인하고 문제가 있으면 Telegram 알림을 보냅니다.
/// `format=json`이 아니면 HTML 대시보드를 반환합니다.
#[utoipa::path(
    get,
    path = "/monitor",
    tag = "Monitoring",
    params(FormatQuery),
    responses(
        (status = 200, description = "모니터링 완료", body = MonitoringSummary),
        (status = 500, description = "모니터링 실패", body = MonitorErrorResponse)
    )
)]
pub async fn monitor_handler(
    State(state): State<AppState>,
    Query(query): Query<FormatQuery>,
) -> Response {
    let config = state.monitor_config().await;
    let summary = Monitor::from_config(&config, state.connector.clone())
        .run()
        .await;

    let status = if summary.is_error() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };

    if query.is_json() {
        if summary.is_error() {
            return (status, Json(MonitorErrorResponse::from(&summary))).into_response();
        }
        return (status, Json(summary)).into_response();
    }

    (status, Html(render_dashboard(&summary, Utc::now()))).into_response()
}

/// 테스트 알림 전송
///
/// 고정된 테스트 메시지를 Telegram으로 보냅니다. GET, POST 모두 허용합니다.
#[utoipa::path(
    post,
    path = "/send-alert",
    tag = "Monitoring",
    params(FormatQuery),
    responses(
        (status = 200, description = "전송 시도 결과", body = SendAlertResponse)
    )
)]
pub async fn send_alert_handler(
    State(state): State<AppState>,
    Query(query): Query<FormatQuery>,
) -> Response {
    let config = state.monitor_config().await;
    let channel = TelegramAlert::from_config(&config);
    let now = Utc::now();

    let message = format_test_alert(&state.config.source_label, now);
    let sent = match channel.send(&message, ParseMode::Html).await {
        Ok(()) => {
            info!("Test alert sent");
            true
        }
        Err(e) => {
            error!(error = %e, "Failed to send test alert");
            false
        }
    };

    if query.is_json() {
        return Json(SendAlertResponse::new(sent, now.to_rfc3339())).into_response();
    }

    Html(render_send_alert_redirect(sent)).into_response()
}
