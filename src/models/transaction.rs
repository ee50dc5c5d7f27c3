//! Transaction models

use chrono::{DateTime, Local, NaiveDateTime};

const SHORT_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Transaction row ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionItem {
    pub date: String,
    pub tx_type: String,
    pub amount: String,
}

/// Format a backend timestamp as a short local date-time.
///
/// Accepts RFC 3339 and `YYYY-MM-DD HH:MM:SS`; anything else is returned as is.
pub fn format_timestamp(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).format(SHORT_FORMAT).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return dt.format(SHORT_FORMAT).to_string();
    }
    raw.to_string()
}
