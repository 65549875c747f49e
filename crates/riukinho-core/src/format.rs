//! Reply text for each lookup outcome.

use crate::table::{normalize, Record};

/// Timestamp layout shown to users.
const TIMESTAMP_DISPLAY: &str = "%d/%m/%Y %H:%M";

/// Reply sent whenever a request fails for reasons the user cannot fix.
pub const GENERIC_FAILURE: &str = "Could not process your request. Please try again later.";

/// Welcome and help text for `/start`.
pub fn start_message() -> String {
    "Hi! I'm Riukinho, the logistics bot. Ask me about picking lists any time.\n\n\
    📌 /status <order> - status of an order\n\
    📌 /list <line> - every order registered for a line\n\
    📌 /pending <line> - the open (Pendente) order for a line"
        .to_string()
}

pub fn status_usage() -> &'static str {
    "Usage: /status <order number>"
}

pub fn list_usage() -> &'static str {
    "Usage: /list <line number>"
}

pub fn pending_usage() -> &'static str {
    "Usage: /pending <line number>"
}

/// Reply for `/status`.
pub fn format_status(raw_order_id: &str, record: Option<&Record>) -> String {
    match record {
        Some(r) => format!("Order {} status: {}", r.order_id, r.status),
        None => format!("Order {} not found.", normalize(raw_order_id)),
    }
}

/// Reply for `/list`: one `"{order} - {status}"` line per record.
pub fn format_line_listing(raw_line: &str, records: &[Record]) -> String {
    let line = normalize(raw_line);
    if records.is_empty() {
        return format!("No records for line {}.", line);
    }

    let body = records
        .iter()
        .map(|r| format!("{} - {}", r.order_id, r.status))
        .collect::<Vec<_>>()
        .join("\n");
    format!("Orders for line {}:\n{}", line, body)
}

/// Reply for `/pending`.
pub fn format_pending(raw_line: &str, record: Option<&Record>) -> String {
    let line = normalize(raw_line);
    let Some(r) = record else {
        return format!("No pending orders for line {}.", line);
    };

    let registered = r
        .registered_at
        .map(|ts| ts.format(TIMESTAMP_DISPLAY).to_string())
        .unwrap_or_else(|| "unknown".to_string());

    format!(
        "Pending order for line {}:\n\
        Order: {}\n\
        Status: {}\n\
        Registered at: {}",
        line, r.order_id, r.status, registered
    )
}
