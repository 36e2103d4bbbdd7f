//! Invoicing system monitoring
//!
//! Pull-model health checks for the invoicing pipeline:
//! - Stuck order detection against the `orders` table
//! - Worker `/health` probing with URL fallback
//! - Telegram alert formatting and delivery

pub mod formatter;
pub mod orchestrator;
pub mod stuck_jobs;
pub mod telegram_alert;
pub mod worker_health;

pub use orchestrator::{Monitor, MonitoringSummary, OverallStatus, RunStatus};
pub use stuck_jobs::{detect_stuck_jobs, StuckJobReport};
pub use telegram_alert::{AlertChannel, ParseMode, TelegramAlert};
pub use worker_health::{HealthProbe, WorkerHealth, WorkerHealthProber};
