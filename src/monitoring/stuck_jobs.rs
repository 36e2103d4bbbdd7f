//! Stuck-job detection
//!
//! An order is stuck when it is still PENDING or PROCESSING more than
//! [`STUCK_THRESHOLD_HOURS`] after it was created.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::domain::order::{Order, OrderStatus, OrderStore};
use crate::utils::AppError;

pub const STUCK_THRESHOLD_HOURS: i64 = 24;

/// One stuck order, as shown in alerts and on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StuckJobReport {
    pub id: String,
    pub external_order_id: String,
    pub status: OrderStatus,
    /// ISO-8601, UTC
    pub created_at: String,
    pub updated_at: Option<String>,
    pub retry_count: i32,
    pub error_message: Option<String>,
    /// Hours since creation, one decimal
    pub hours_stuck: f64,
}

impl StuckJobReport {
    pub fn from_order(order: &Order, now: DateTime<Utc>) -> Self {
        Self {
            id: order.id.to_string(),
            external_order_id: order.external_order_id.clone(),
            status: order.status,
            created_at: iso_timestamp(&order.created_at),
            updated_at: order.updated_at.as_ref().map(iso_timestamp),
            retry_count: order.retry_count,
            error_message: order.error_message.clone(),
            hours_stuck: hours_since(order.created_at, now),
        }
    }
}

pub fn stuck_cutoff(now: DateTime<Utc>) -> NaiveDateTime {
    (now - Duration::hours(STUCK_THRESHOLD_HOURS)).naive_utc()
}

/// Stuck orders, oldest first
#[instrument(skip(store))]
pub async fn detect_stuck_jobs(
    store: &dyn OrderStore,
    now: DateTime<Utc>,
) -> Result<Vec<StuckJobReport>, AppError> {
    let cutoff = stuck_cutoff(now);

    let mut orders: Vec<Order> = store
        .find_unfinished_created_before(cutoff)
        .await?
        .into_iter()
        .filter(|order| order.is_stuck(cutoff))
        .collect();
    orders.sort_by_key(|order| order.created_at);

    let reports: Vec<StuckJobReport> = orders
        .iter()
        .map(|order| StuckJobReport::from_order(order, now))
        .collect();

    if reports.is_empty() {
        info!("No stuck jobs found");
    } else {
        info!(count = reports.len(), "Found stuck jobs");
    }

    Ok(reports)
}

fn hours_since(created_at: NaiveDateTime, now: DateTime<Utc>) -> f64 {
    let elapsed = now.naive_utc() - created_at;
    let hours = elapsed.num_milliseconds() as f64 / 3_600_000.0;
    (hours * 10.0).round() / 10.0
}

fn iso_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}
