use std::env;

use super::secrets::{Credential, SecretChain};

/// Telegram Bot API 기본 주소
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// 워커 서비스 고정 폴백 주소
pub const FALLBACK_WORKER_URL: &str =
    "https://lunette-invoicing-898902894034.europe-west1.run.app/api/v1";

/// Secret Manager 기본 프로젝트 (`GOOGLE_CLOUD_PROJECT`가 없을 때)
pub const DEFAULT_GCP_PROJECT: &str = "lunette-minimax";

/// 프로세스 설정 (환경 변수에서 한 번 로드)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub telegram_api_base: String,
    pub worker_fallback_url: String,

    // Secret Manager
    pub gcp_project_id: String,
    pub secret_manager_api_base: Option<String>,
    pub gcp_metadata_base: Option<String>,

    /// 테스트 알림에 표시되는 출처
    pub source_label: String,
}

impl AppConfig {
    /// 환경 변수에서 설정 로드
    pub fn from_env() -> Result<Self, ConfigError> {
        let server_port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let telegram_api_base = env::var("TELEGRAM_API_BASE")
            .unwrap_or_else(|_| DEFAULT_TELEGRAM_API_BASE.to_string());

        let worker_fallback_url =
            env::var("WORKER_FALLBACK_URL").unwrap_or_else(|_| FALLBACK_WORKER_URL.to_string());

        let gcp_project_id = non_empty_var("GOOGLE_CLOUD_PROJECT").unwrap_or_else(|| {
            tracing::info!(
                project = DEFAULT_GCP_PROJECT,
                "GOOGLE_CLOUD_PROJECT 환경변수가 없어 기본 프로젝트를 사용합니다."
            );
            DEFAULT_GCP_PROJECT.to_string()
        });

        Ok(Self {
            server_port,
            telegram_api_base,
            worker_fallback_url,
            gcp_project_id,
            secret_manager_api_base: non_empty_var("SECRET_MANAGER_API_BASE"),
            gcp_metadata_base: non_empty_var("GCP_METADATA_BASE"),
            source_label: env::var("MONITOR_SOURCE")
                .unwrap_or_else(|_| "invoicing-monitoring".to_string()),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: 8080,
            telegram_api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
            worker_fallback_url: FALLBACK_WORKER_URL.to_string(),
            gcp_project_id: DEFAULT_GCP_PROJECT.to_string(),
            secret_manager_api_base: None,
            gcp_metadata_base: None,
            source_label: "invoicing-monitoring".to_string(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// 호출 단위 설정
///
/// 매 모니터링 패스/이벤트마다 `SecretChain`으로부터 새로 만들어
/// 필요한 컴포넌트에 명시적으로 전달합니다.
#[derive(Debug, Clone, Default)]
pub struct MonitorConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub database_url: Option<String>,
    pub worker_service_url: Option<String>,
    pub worker_fallback_url: String,
    pub telegram_api_base: String,
}

impl MonitorConfig {
    pub async fn resolve(secrets: &SecretChain, app: &AppConfig) -> Self {
        Self {
            bot_token: secrets.resolve(&Credential::BOT_TOKEN).await,
            chat_id: secrets.resolve(&Credential::CHAT_ID).await,
            database_url: secrets.resolve(&Credential::DATABASE_URL).await,
            worker_service_url: secrets.resolve(&Credential::WORKER_SERVICE_URL).await,
            worker_fallback_url: app.worker_fallback_url.clone(),
            telegram_api_base: app.telegram_api_base.clone(),
        }
    }

    /// Bot token and chat id, when both are configured
    pub fn telegram_credentials(&self) -> Option<(&str, &str)> {
        match (self.bot_token.as_deref(), self.chat_id.as_deref()) {
            (Some(token), Some(chat_id)) => Some((token, chat_id)),
            _ => None,
        }
    }

    /// Candidate worker base URLs: configured first, then the fallback.
    pub fn worker_urls(&self) -> Vec<String> {
        let mut urls = Vec::with_capacity(2);
        if let Some(configured) = &self.worker_service_url {
            urls.push(configured.clone());
        }
        if !urls.contains(&self.worker_fallback_url) {
            urls.push(self.worker_fallback_url.clone());
        }
        urls
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,
}
