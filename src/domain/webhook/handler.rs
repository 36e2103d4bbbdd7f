use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::info;

use super::dto::{NotifyResponse, PubSubPushEnvelope};
use crate::notification::EventNotifier;
use crate::utils::{AppError, ErrorResponse};
use crate::AppState;

/// 빌드/인보이스 이벤트 수신 (Pub/Sub push)
///
/// 처리 결과와 관계없이 200을 반환해 메시지를 ack 합니다.
/// 봉투 형식이 잘못된 경우에만 400을 반환합니다.
#[utoipa::path(
    post,
    path = "/notify",
    tag = "Notification",
    request_body = PubSubPushEnvelope,
    responses(
        (status = 200, description = "이벤트 처리 완료", body = NotifyResponse),
        (status = 400, description = "잘못된 요청 형식", body = ErrorResponse)
    )
)]
pub async fn notify_handler(
    State(state): State<AppState>,
    request: Result<Json<PubSubPushEnvelope>, JsonRejection>,
) -> Result<Json<NotifyResponse>, AppError> {
    // JSON 파싱 에러 처리
    let Json(envelope) = request.map_err(AppError::from)?;

    info!(
        message_id = ?envelope.message.message_id,
        subscription = ?envelope.subscription,
        "Received push notification"
    );

    let config = state.monitor_config().await;
    let outcome = EventNotifier::from_config(&config)
        .handle(&envelope.message.data)
        .await;

    Ok(Json(NotifyResponse {
        outcome,
        message_id: envelope.message.message_id,
    }))
}
