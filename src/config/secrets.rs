//! Named credential lookup
//!
//! Credentials are resolved through an ordered chain of providers. The first
//! provider that returns a non-empty value wins; the process environment is
//! always first.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::AppConfig;
use crate::utils::AppError;

const DEFAULT_SECRET_MANAGER_API_BASE: &str = "https://secretmanager.googleapis.com";
const DEFAULT_METADATA_BASE: &str = "http://metadata.google.internal";

/// 메타데이터 서버와 Secret Manager 요청 각각의 타임아웃
pub const SECRET_TIMEOUT: Duration = Duration::from_secs(10);

/// 만료 직전의 토큰은 재사용하지 않음
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// A credential with its environment variable name and its secret store name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credential {
    pub env_var: &'static str,
    pub secret_name: &'static str,
}

impl Credential {
    pub const BOT_TOKEN: Credential = Credential {
        env_var: "BOT_TOKEN",
        secret_name: "TELEGRAM_BOT_TOKEN",
    };
    pub const CHAT_ID: Credential = Credential {
        env_var: "CHAT_ID",
        secret_name: "TELEGRAM_CHAT_ID",
    };
    pub const DATABASE_URL: Credential = Credential {
        env_var: "DATABASE_URL",
        secret_name: "DATABASE_URL",
    };
    pub const WORKER_SERVICE_URL: Credential = Credential {
        env_var: "WORKER_SERVICE_URL",
        secret_name: "WORKER_SERVICE_URL",
    };
}

/// 시크릿 조회 인터페이스
///
/// 조회 실패는 "값 없음"으로 취급합니다. 실패 원인은 구현체가 로그로 남깁니다.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn get(&self, credential: &Credential) -> Option<String>;
}

/// Process environment
#[derive(Debug, Default, Clone)]
pub struct EnvSecretProvider;

#[async_trait]
impl SecretProvider for EnvSecretProvider {
    fn name(&self) -> &str {
        "env"
    }

    async fn get(&self, credential: &Credential) -> Option<String> {
        std::env::var(credential.env_var).ok()
    }
}

/// Fixed values keyed by secret name
#[derive(Debug, Default, Clone)]
pub struct StaticSecretProvider {
    values: HashMap<String, String>,
}

impl StaticSecretProvider {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

#[async_trait]
impl SecretProvider for StaticSecretProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn get(&self, credential: &Credential) -> Option<String> {
        self.values.get(credential.secret_name).cloned()
    }
}

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct AccessSecretVersionResponse {
    payload: SecretPayload,
}

#[derive(Debug, Deserialize)]
struct SecretPayload {
    data: String,
}

/// Google Cloud Secret Manager (latest version of each secret)
///
/// The access token comes from the instance metadata server, so this only
/// works on GCP compute (Cloud Run, GCE, GKE). It is kept until shortly
/// before `expires_in`, so resolving several credentials costs one token call.
pub struct SecretManagerProvider {
    client: Client,
    project_id: String,
    api_base: String,
    metadata_base: String,
    timeout: Duration,
    token: Mutex<Option<CachedToken>>,
}

impl SecretManagerProvider {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            project_id: project_id.into(),
            api_base: DEFAULT_SECRET_MANAGER_API_BASE.to_string(),
            metadata_base: DEFAULT_METADATA_BASE.to_string(),
            timeout: SECRET_TIMEOUT,
            token: Mutex::new(None),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_metadata_base(mut self, metadata_base: impl Into<String>) -> Self {
        self.metadata_base = metadata_base.into();
        self
    }

    async fn access_token(&self) -> Result<String, AppError> {
        // 동시 조회가 토큰을 중복 발급받지 않도록 요청 동안 잠금 유지
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.value.clone());
            }
        }

        let url = format!(
            "{}/computeMetadata/v1/instance/service-accounts/default/token",
            self.metadata_base.trim_end_matches('/')
        );

        let response = self
            .client
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AppError::configuration(format!("Metadata server unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::configuration(format!(
                "Metadata server returned {}",
                response.status()
            )));
        }

        let token: MetadataToken = response
            .json()
            .await
            .map_err(|e| AppError::configuration(format!("Invalid metadata token: {}", e)))?;

        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(0))
            .saturating_sub(TOKEN_REFRESH_MARGIN);
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });

        Ok(token.access_token)
    }

    async fn access_secret(&self, secret_name: &str) -> Result<String, AppError> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/v1/projects/{}/secrets/{}/versions/latest:access",
            self.api_base.trim_end_matches('/'),
            self.project_id,
            secret_name
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AppError::configuration(format!("Secret Manager unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::configuration(format!(
                "Secret Manager returned {}",
                response.status()
            )));
        }

        let body: AccessSecretVersionResponse = response
            .json()
            .await
            .map_err(|e| AppError::configuration(format!("Invalid secret response: {}", e)))?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(body.payload.data.as_bytes())
            .map_err(|e| AppError::configuration(format!("Invalid secret encoding: {}", e)))?;

        let value = String::from_utf8(bytes)
            .map_err(|e| AppError::configuration(format!("Secret is not UTF-8: {}", e)))?;

        Ok(value.trim().to_string())
    }
}

#[async_trait]
impl SecretProvider for SecretManagerProvider {
    fn name(&self) -> &str {
        "secret-manager"
    }

    async fn get(&self, credential: &Credential) -> Option<String> {
        match self.access_secret(credential.secret_name).await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(secret = credential.secret_name, error = %e, "Failed to get secret");
                None
            }
        }
    }
}

/// Ordered provider chain, first non-empty value wins
pub struct SecretChain {
    providers: Vec<Box<dyn SecretProvider>>,
}

impl SecretChain {
    pub fn new(providers: Vec<Box<dyn SecretProvider>>) -> Self {
        Self { providers }
    }

    /// Environment first, then Secret Manager
    pub fn from_app_config(config: &AppConfig) -> Self {
        let mut secret_manager = SecretManagerProvider::new(&config.gcp_project_id);
        if let Some(api_base) = &config.secret_manager_api_base {
            secret_manager = secret_manager.with_api_base(api_base);
        }
        if let Some(metadata_base) = &config.gcp_metadata_base {
            secret_manager = secret_manager.with_metadata_base(metadata_base);
        }

        Self::new(vec![Box::new(EnvSecretProvider), Box::new(secret_manager)])
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub async fn resolve(&self, credential: &Credential) -> Option<String> {
        for provider in &self.providers {
            if let Some(value) = provider.get(credential).await {
                if !value.trim().is_empty() {
                    debug!(
                        credential = credential.env_var,
                        provider = provider.name(),
                        "Resolved credential"
                    );
                    return Some(value);
                }
            }
        }

        debug!(credential = credential.env_var, "Credential not found");
        None
    }
}
