//! HTML dashboard for `/monitor`

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::monitoring::formatter::{escape_html, truncate_with_ellipsis, MAX_JOB_ERROR_CHARS};
use crate::monitoring::{MonitoringSummary, OverallStatus};

const STYLE: &str = r#"
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 40px; background: #f8f9fa; }
        .container { max-width: 800px; margin: 0 auto; background: white; padding: 40px; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
        h1 { color: #2c3e50; margin-bottom: 30px; }
        .status { padding: 15px; margin: 15px 0; border-radius: 5px; font-weight: bold; }
        .status.healthy { background: #d4edda; color: #155724; border-left: 4px solid #28a745; }
        .status.error { background: #f8d7da; color: #721c24; border-left: 4px solid #dc3545; }
        .button { background: #007bff; color: white; padding: 12px 24px; border-radius: 5px; text-decoration: none; display: inline-block; margin: 10px 5px 0 0; }
        .button.danger { background: #dc3545; }
        .details { background: #f8f9fa; padding: 15px; border-radius: 5px; margin: 15px 0; }
        .timestamp { color: #6c757d; font-size: 0.9em; }
"#;

/// Auto-refresh interval of the page
const REFRESH_MS: u64 = 5 * 60 * 1000;

pub fn render_dashboard(summary: &MonitoringSummary, now: DateTime<Utc>) -> String {
    let mut body = String::new();

    let _ = write!(
        body,
        r#"<div class="timestamp">Last updated: <span id="timestamp">{}</span></div>"#,
        now.format("%Y-%m-%d %H:%M:%S UTC")
    );

    body.push_str(&status_block(summary));

    if !summary.stuck_jobs.is_empty() {
        body.push_str(&stuck_jobs_block(summary));
    }

    body.push_str(&worker_block(summary));

    body.push_str(r#"<div style="margin-top: 40px;">"#);
    body.push_str(r#"<a href="/monitor" class="button">🔄 Run Check Now</a>"#);
    body.push_str(r#"<a href="/monitor?format=json" class="button">📊 JSON API</a>"#);
    if summary.stuck_jobs_count > 0 {
        body.push_str(r#"<a href="/send-alert" class="button danger">📱 Send Telegram Alert</a>"#);
    }
    body.push_str("</div>");

    body.push_str(
        r#"<div class="details"><h3>ℹ️ About</h3><p>This monitoring system checks:</p><ul>
<li><strong>Stuck Jobs:</strong> Orders that have been in PENDING/PROCESSING status for more than 24 hours</li>
<li><strong>Worker Health:</strong> Whether the invoicing worker service is responding to health checks</li>
</ul><p>Alerts are automatically sent to Telegram when issues are detected.</p></div>"#,
    );

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Invoicing System Monitor</title>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>{}</style>
</head>
<body>
    <div class="container">
        <h1>🔍 Invoicing System Monitor</h1>
        {}
    </div>
    <script>setTimeout(() => location.reload(), {});</script>
</body>
</html>"#,
        STYLE, body, REFRESH_MS
    )
}

fn status_block(summary: &MonitoringSummary) -> String {
    if let Some(error) = &summary.error {
        return format!(
            r#"<div class="status error">🚨 Monitoring Error: {}</div>"#,
            escape_html(error)
        );
    }

    match summary.overall_status {
        Some(OverallStatus::Healthy) => {
            r#"<div class="status healthy">✅ System Status: All systems operational</div>"#
                .to_string()
        }
        _ => r#"<div class="status error">🚨 Issues Detected</div>"#.to_string(),
    }
}

fn stuck_jobs_block(summary: &MonitoringSummary) -> String {
    let mut block = format!(
        r#"<div class="details"><h3>🚨 Stuck Jobs ({})</h3><p>Orders stuck in PENDING/PROCESSING status for more than 24 hours:</p><ul>"#,
        summary.stuck_jobs_count
    );

    for job in &summary.stuck_jobs {
        let _ = write!(
            block,
            "<li><strong>Order {}</strong>: {:.1}h in {} status",
            escape_html(&job.external_order_id),
            job.hours_stuck,
            job.status
        );
        if let Some(error) = job.error_message.as_deref().filter(|e| !e.is_empty()) {
            let _ = write!(
                block,
                "<br><small>Error: {}</small>",
                escape_html(&truncate_with_ellipsis(error, MAX_JOB_ERROR_CHARS))
            );
        }
        block.push_str("</li>");
    }

    block.push_str("</ul></div>");
    block
}

fn worker_block(summary: &MonitoringSummary) -> String {
    let status = match &summary.worker_status {
        Some(health) if health.healthy => format!(
            r#"<div class="status healthy">Worker service is healthy ({}s response time)</div>"#,
            health
                .response_time
                .map(|t| t.to_string())
                .unwrap_or_else(|| "N/A".to_string())
        ),
        Some(health) => format!(
            r#"<div class="status error">Worker service is not responding: {}</div>"#,
            escape_html(health.error.as_deref().unwrap_or("Unknown error"))
        ),
        None => format!(
            r#"<div class="status error">Worker service is not responding: {}</div>"#,
            escape_html(summary.error.as_deref().unwrap_or("Unknown error"))
        ),
    };

    format!(
        r#"<div class="details"><h3>🏥 Worker Health</h3>{}</div>"#,
        status
    )
}

/// Page returned by `/send-alert` without `format=json`
pub fn render_send_alert_redirect(sent: bool) -> String {
    let message = if sent {
        "Test alert sent successfully!"
    } else {
        "Failed to send test alert"
    };

    format!(
        "<script>\n    alert('{}');\n    window.location.href = '/';\n</script>",
        message
    )
}
