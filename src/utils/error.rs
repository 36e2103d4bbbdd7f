use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use tracing::error;

use super::response::ErrorResponse;

/// 애플리케이션 전역 에러 타입
///
/// Monitoring errors never cross an entry point; they end up in a summary or an
/// outcome value. Only the HTTP layer turns them into responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing credential or connection string
    #[error("{0}")]
    Configuration(String),
    /// Query or connection failure against the order store
    #[error("{0}")]
    Store(String),
    /// Alert delivery failure
    #[error("{0}")]
    Channel(String),
    /// Malformed inbound event payload
    #[error("{0}")]
    Decode(String),
    #[error("{0}")]
    BadRequest(String),
}

impl AppError {
    /// 에러 메시지 반환
    pub fn message(&self) -> String {
        match self {
            AppError::BadRequest(msg) => format!("잘못된 요청 형식입니다: {}", msg),
            other => other.to_string(),
        }
    }

    /// 에러 코드 반환
    pub fn error_code(&self) -> String {
        match self {
            AppError::Configuration(_) => "MONITOR_001",
            AppError::Store(_) => "MONITOR_002",
            AppError::Channel(_) => "MONITOR_004",
            AppError::Decode(_) => "NOTIFY_001",
            AppError::BadRequest(_) => "COMMON400",
        }
        .to_string()
    }

    /// HTTP 상태 코드 반환
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Decode(_) => StatusCode::BAD_REQUEST,
            AppError::Channel(_) => StatusCode::BAD_GATEWAY,
            AppError::Configuration(_) | AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.message();

        error!("Error [{}]: {}", error_code, message);

        let error_response = ErrorResponse::new(error_code, message);

        (status, Json(error_response)).into_response()
    }
}

/// JsonRejection을 AppError로 변환
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.to_string())
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Store(err.to_string())
    }
}

/// 편의 함수들
impl AppError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        AppError::Configuration(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        AppError::Store(msg.into())
    }

    pub fn channel(msg: impl Into<String>) -> Self {
        AppError::Channel(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        AppError::Decode(msg.into())
    }
}
