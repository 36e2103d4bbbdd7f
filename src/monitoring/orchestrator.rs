//! One monitoring pass: detect stuck jobs, probe the worker, send alerts.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;

use super::formatter::{format_failure_alert, format_stuck_jobs_alert, format_worker_health_alert};
use super::stuck_jobs::{detect_stuck_jobs, StuckJobReport};
use super::telegram_alert::{AlertChannel, ParseMode, TelegramAlert};
use super::worker_health::{HealthProbe, WorkerHealth, WorkerHealthProber};
use crate::config::MonitorConfig;
use crate::domain::order::{OrderStore, StoreConnector};
use crate::utils::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Completed,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Healthy,
    Issues,
}

/// Result of one monitoring pass
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonitoringSummary {
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_status: Option<OverallStatus>,
    pub timestamp: String,
    pub stuck_jobs_count: usize,
    pub stuck_jobs: Vec<StuckJobReport>,
    pub worker_healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_status: Option<WorkerHealth>,
    /// Alerts attempted
    pub alerts_sent: usize,
    /// Alerts the channel accepted
    pub alerts_delivered: usize,
    pub telegram_alert_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MonitoringSummary {
    fn completed(
        at: DateTime<Utc>,
        stuck_jobs: Vec<StuckJobReport>,
        health: WorkerHealth,
        attempted: usize,
        delivered: usize,
    ) -> Self {
        let overall = if stuck_jobs.is_empty() && health.healthy {
            OverallStatus::Healthy
        } else {
            OverallStatus::Issues
        };

        Self {
            status: RunStatus::Completed,
            overall_status: Some(overall),
            timestamp: at.to_rfc3339(),
            stuck_jobs_count: stuck_jobs.len(),
            stuck_jobs,
            worker_healthy: health.healthy,
            worker_status: Some(health),
            alerts_sent: attempted,
            alerts_delivered: delivered,
            telegram_alert_sent: delivered > 0,
            error: None,
        }
    }

    fn failed(at: DateTime<Utc>, error: String) -> Self {
        Self {
            status: RunStatus::Error,
            overall_status: None,
            timestamp: at.to_rfc3339(),
            stuck_jobs_count: 0,
            stuck_jobs: Vec::new(),
            worker_healthy: false,
            worker_status: None,
            alerts_sent: 0,
            alerts_delivered: 0,
            telegram_alert_sent: false,
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == RunStatus::Error
    }
}

/// Monitoring orchestrator
pub struct Monitor {
    database_url: Option<String>,
    connector: Arc<dyn StoreConnector>,
    prober: Arc<dyn HealthProbe>,
    channel: Arc<dyn AlertChannel>,
}

impl Monitor {
    pub fn new(
        database_url: Option<String>,
        connector: Arc<dyn StoreConnector>,
        prober: Arc<dyn HealthProbe>,
        channel: Arc<dyn AlertChannel>,
    ) -> Self {
        Self {
            database_url,
            connector,
            prober,
            channel,
        }
    }

    /// Production wiring for one invocation
    pub fn from_config(config: &MonitorConfig, connector: Arc<dyn StoreConnector>) -> Self {
        Self::new(
            config.database_url.clone(),
            connector,
            Arc::new(WorkerHealthProber::new(config.worker_urls())),
            Arc::new(TelegramAlert::from_config(config)),
        )
    }

    /// Runs one pass. Never fails; failures end up in the summary.
    #[instrument(skip(self))]
    pub async fn run(&self) -> MonitoringSummary {
        info!("Starting invoicing system monitoring");

        match self.run_pass().await {
            Ok(summary) => {
                info!(
                    stuck_jobs = summary.stuck_jobs_count,
                    worker_healthy = summary.worker_healthy,
                    alerts_sent = summary.alerts_sent,
                    alerts_delivered = summary.alerts_delivered,
                    "Monitoring pass completed"
                );
                summary
            }
            Err(e) => {
                error!(error = %e, "Monitoring pass failed");
                let now = Utc::now();
                let alert = format_failure_alert(&e.to_string(), now);
                if let Err(send_err) = self.channel.send(&alert, ParseMode::Html).await {
                    warn!(error = %send_err, "Failed to send monitoring error alert");
                }
                MonitoringSummary::failed(now, e.to_string())
            }
        }
    }

    async fn run_pass(&self) -> Result<MonitoringSummary, AppError> {
        let database_url = self
            .database_url
            .as_deref()
            .ok_or_else(|| AppError::configuration("DATABASE_URL secret not found"))?;

        let store = self.connector.acquire(database_url).await?;
        let outcome = self.check_and_alert(store.as_ref()).await;

        if let Err(e) = store.release().await {
            warn!(error = %e, "Failed to release database connection");
        }

        outcome
    }

    async fn check_and_alert(&self, store: &dyn OrderStore) -> Result<MonitoringSummary, AppError> {
        let now = Utc::now();

        let stuck_jobs = detect_stuck_jobs(store, now).await?;
        let health = self.prober.probe().await;
        if !health.healthy {
            warn!(error = ?health.error, "Worker health check failed");
        }

        let alerts: Vec<String> = [
            format_stuck_jobs_alert(&stuck_jobs),
            format_worker_health_alert(&health),
        ]
        .into_iter()
        .filter(|alert| !alert.is_empty())
        .collect();

        let mut delivered = 0;
        for alert in &alerts {
            match self.channel.send(alert, ParseMode::Html).await {
                Ok(()) => delivered += 1,
                Err(e) => warn!(error = %e, "Failed to send Telegram alert"),
            }
        }

        Ok(MonitoringSummary::completed(
            now,
            stuck_jobs,
            health,
            alerts.len(),
            delivered,
        ))
    }
}
