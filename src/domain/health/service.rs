use std::sync::OnceLock;
use std::time::Instant;

use chrono::Utc;

use super::dto::HealthStatus;

pub const SERVICE_NAME: &str = "invoicing-monitoring";

/// 서버 시작 시간 (전역)
static START_TIME: OnceLock<Instant> = OnceLock::new();

/// 서버 시작 시간 초기화
///
/// main 함수에서 서버 시작 시 호출해야 합니다.
pub fn init_start_time() {
    START_TIME.get_or_init(Instant::now);
}

/// 서버 가동 시간(초) 반환
pub fn get_uptime_secs() -> u64 {
    START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0)
}

/// Worker 상태와 무관한 자체 생존 확인
pub fn check_health() -> HealthStatus {
    HealthStatus {
        status: "healthy",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: get_uptime_secs(),
        timestamp: Utc::now().to_rfc3339(),
    }
}
