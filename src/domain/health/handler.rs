use axum::Json;

use super::dto::HealthStatus;
use super::service::check_health;

/// 헬스체크 API
///
/// 모니터링 서비스 자체의 상태, 버전, 가동 시간을 반환합니다.
/// 워커 상태는 `/monitor`에서 확인합니다.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "헬스체크 성공", body = HealthStatus)
    )
)]
pub async fn health_check() -> Json<HealthStatus> {
    Json(check_health())
}
