//! Worker liveness probe
//!
//! Tries `GET <url>/health` on each candidate URL in order and stops at the
//! first HTTP 200.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

/// Worker 헬스체크 타임아웃 (10초)
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of one probe round
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WorkerHealth {
    pub healthy: bool,
    /// Health URL that answered, or the only one tried
    pub url: Option<String>,
    /// Round-trip seconds, two decimals
    pub response_time: Option<f64>,
    /// Last error seen, when unhealthy
    pub error: Option<String>,
}

impl WorkerHealth {
    pub fn healthy(url: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            healthy: true,
            url: Some(url.into()),
            response_time: Some((elapsed.as_secs_f64() * 100.0).round() / 100.0),
            error: None,
        }
    }

    /// `url` is set only when a single URL was tried
    pub fn unhealthy(url: Option<String>, error: Option<String>) -> Self {
        Self {
            healthy: false,
            url,
            response_time: None,
            error,
        }
    }
}

/// 워커 헬스체크 인터페이스
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Never fails; problems are recorded in the result
    async fn probe(&self) -> WorkerHealth;
}

#[derive(Debug, Clone)]
pub struct WorkerHealthProber {
    candidates: Vec<String>,
    client: Client,
    timeout: Duration,
}

impl WorkerHealthProber {
    pub fn new(candidates: Vec<String>) -> Self {
        Self {
            candidates,
            client: Client::new(),
            timeout: PROBE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub fn health_url(base_url: &str) -> String {
    format!("{}/health", base_url.trim_end_matches('/'))
}

#[async_trait]
impl HealthProbe for WorkerHealthProber {
    async fn probe(&self) -> WorkerHealth {
        let mut last_error = None;

        for base_url in &self.candidates {
            let url = health_url(base_url);
            let start = Instant::now();

            match self.client.get(&url).timeout(self.timeout).send().await {
                Ok(response) if response.status() == reqwest::StatusCode::OK => {
                    let health = WorkerHealth::healthy(url, start.elapsed());
                    info!(
                        url = ?health.url,
                        response_time = ?health.response_time,
                        "Worker is healthy"
                    );
                    return health;
                }
                Ok(response) => {
                    warn!(url = %url, status = %response.status(), "Worker health check failed");
                    last_error = Some(format!("HTTP {}", response.status().as_u16()));
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Worker health check request failed");
                    last_error = Some(e.to_string());
                }
            }
        }

        let tried = match self.candidates.as_slice() {
            [only] => Some(health_url(only)),
            _ => None,
        };
        WorkerHealth::unhealthy(tried, last_error)
    }
}
