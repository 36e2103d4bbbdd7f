//! Telegram Markdown templates for build and invoice events

use super::event::{BuildEvent, InvoiceEvent, InvoiceOutcome, InvoiceStage};

/// Placeholder for fields the payload left out
pub const NOT_AVAILABLE: &str = "N/A";

/// `None` for non-final build statuses
pub fn build_message(build: &BuildEvent) -> Option<String> {
    if !build.is_final() {
        return None;
    }

    let emoji = if build.is_success() { "✅" } else { "❌" };

    Some(
        [
            format!("{} *Build {}*", emoji, build.status),
            format!("📁 Project: `{}`", build.project_id),
            format!("🔗 Repo: `{}`", build.repo_name),
            format!("🌿 Branch: `{}`", build.branch),
            format!("🆔 Build ID: `{}`", build.build_id),
        ]
        .join("\n"),
    )
}

/// One template per stage/outcome pair
pub fn invoice_message(invoice: &InvoiceEvent) -> String {
    let invoice_id = format!("🧾 Invoice ID: `{}`", or_na(&invoice.invoice_id));
    let order_id = format!("📋 Order ID: `{}`", or_na(&invoice.external_order_id));
    let customer = format!("👤 Customer: `{}`", invoice.customer_name);
    let amount = format!(
        "💵 Amount: `{} {}`",
        or_na(&invoice.amount),
        invoice.currency
    );
    let status = format!("📊 Status: `{}`", or_na(&invoice.status));
    let error = invoice
        .error_message
        .as_ref()
        .map(|e| format!("🚨 Error: `{}`", e));

    let lines = match (invoice.stage(), invoice.outcome()) {
        (InvoiceStage::Creation, InvoiceOutcome::Success) => vec![
            "💰 *Invoice Created Successfully*".to_string(),
            invoice_id,
            order_id,
            customer,
            amount,
        ],
        (InvoiceStage::Creation, InvoiceOutcome::Failure) => {
            let mut lines = vec!["❌ *Invoice Creation Failed*".to_string(), order_id, customer];
            lines.extend(error);
            lines
        }
        (InvoiceStage::Creation, InvoiceOutcome::Other) => vec![
            "⏳ *Invoice Creation Attempt*".to_string(),
            order_id,
            customer,
            status,
        ],
        (InvoiceStage::Completion, InvoiceOutcome::Success) => vec![
            "✅ *Invoice Completed & Fiscalized*".to_string(),
            invoice_id,
            order_id,
            customer,
            amount,
        ],
        (InvoiceStage::Completion, InvoiceOutcome::Failure) => {
            let mut lines = vec![
                "❌ *Invoice Completion Failed*".to_string(),
                invoice_id,
                order_id,
                customer,
            ];
            lines.extend(error);
            lines
        }
        (InvoiceStage::Completion, InvoiceOutcome::Other) => {
            let mut lines = vec![
                "⚠️ *Invoice Completion Issue*".to_string(),
                invoice_id,
                order_id,
                status,
            ];
            lines.extend(error);
            lines
        }
        (InvoiceStage::Other, _) => vec![
            format!("📄 *Invoice Event: {}*", invoice.event_type),
            invoice_id,
            order_id,
            status,
        ],
    };

    lines.join("\n")
}

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(NOT_AVAILABLE)
}
