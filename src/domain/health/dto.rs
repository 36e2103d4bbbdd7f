use serde::Serialize;
use utoipa::ToSchema;

/// 모니터링 서비스 자체 생존 상태
#[derive(Serialize, Debug, ToSchema)]
pub struct HealthStatus {
    /// 항상 healthy (프로세스가 응답하면 정상)
    #[schema(example = "healthy")]
    pub status: &'static str,
    #[schema(example = "invoicing-monitoring")]
    pub service: &'static str,
    /// 서버 버전
    #[schema(example = "0.1.0")]
    pub version: &'static str,
    /// 서버 가동 시간 (초)
    #[schema(example = 3600)]
    pub uptime_secs: u64,
    pub timestamp: String,
}
