//! Alert text for the monitoring pass (Telegram HTML parse mode)

use chrono::{DateTime, Utc};

use super::stuck_jobs::{StuckJobReport, STUCK_THRESHOLD_HOURS};
use super::worker_health::WorkerHealth;

/// Jobs listed in one alert
pub const MAX_LISTED_JOBS: usize = 5;
/// Error message characters shown per job
pub const MAX_JOB_ERROR_CHARS: usize = 100;
/// Error characters shown in the monitoring error alert
pub const MAX_FAILURE_CHARS: usize = 200;

/// Cuts `text` to `max_chars` characters, appending `...` when something was cut
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

/// Escapes the characters Telegram's HTML parse mode treats as markup
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Empty when there is nothing to report
pub fn format_stuck_jobs_alert(stuck_jobs: &[StuckJobReport]) -> String {
    if stuck_jobs.is_empty() {
        return String::new();
    }

    let mut lines = vec![
        "🚨 <b>STUCK JOBS ALERT</b>".to_string(),
        format!(
            "Found {} jobs stuck for more than {} hours:",
            stuck_jobs.len(),
            STUCK_THRESHOLD_HOURS
        ),
        String::new(),
    ];

    for job in stuck_jobs.iter().take(MAX_LISTED_JOBS) {
        lines.push(format!(
            "📋 Order: <code>{}</code>",
            escape_html(&job.external_order_id)
        ));
        lines.push(format!(
            "⏱ Stuck: {:.1} hours ({})",
            job.hours_stuck, job.status
        ));
        lines.push(format!("🔄 Retries: {}", job.retry_count));

        if let Some(error) = job.error_message.as_deref().filter(|e| !e.is_empty()) {
            lines.push(format!(
                "❌ Error: <code>{}</code>",
                escape_html(&truncate_with_ellipsis(error, MAX_JOB_ERROR_CHARS))
            ));
        }

        lines.push(String::new());
    }

    if stuck_jobs.len() > MAX_LISTED_JOBS {
        lines.push(format!(
            "... and {} more stuck jobs",
            stuck_jobs.len() - MAX_LISTED_JOBS
        ));
    }

    lines.join("\n")
}

/// Empty when the worker is healthy
pub fn format_worker_health_alert(health: &WorkerHealth) -> String {
    if health.healthy {
        return String::new();
    }

    format!(
        "🔴 <b>WORKER HEALTH ALERT</b>

The invoicing worker service is not responding!

❌ Status: Unhealthy
🌐 Last checked: {}
⚠️ Error: {}

This means new invoice jobs may not be processed.",
        escape_html(health.url.as_deref().unwrap_or("Multiple URLs tried")),
        escape_html(health.error.as_deref().unwrap_or("Unknown error"))
    )
}

/// Sent once when a monitoring pass fails
pub fn format_failure_alert(error: &str, at: DateTime<Utc>) -> String {
    let error: String = error.chars().take(MAX_FAILURE_CHARS).collect();

    format!(
        "🚨 <b>MONITORING SYSTEM ERROR</b>

The invoicing monitoring system encountered an error:

❌ Error: <code>{}</code>
⏰ Time: {}

Please check the service logs for more details.",
        escape_html(&error),
        at.to_rfc3339()
    )
}

/// Manual test message for `/send-alert`
pub fn format_test_alert(source: &str, at: DateTime<Utc>) -> String {
    format!(
        "🧪 <b>TEST ALERT</b>

This is a manual test alert from the monitoring system.

⏰ Time: {}
🌐 Source: {}

If you receive this message, Telegram notifications are working correctly!",
        at.to_rfc3339(),
        escape_html(source)
    )
}
