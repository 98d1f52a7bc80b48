pub mod counter;
pub mod error;

use serde::Serialize;

const STATUS_OK: &str = "ok";

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: String,
    pub timestamp: String,
}

impl Health {
    pub fn ok() -> Self {
        Self {
            status: STATUS_OK.to_string(),
            timestamp: format_timestamp(chrono::Utc::now().naive_utc()),
        }
    }
}

/// RFC 3339, UTC, microsecond precision to match what the store keeps
pub fn format_timestamp(timestamp: chrono::NaiveDateTime) -> String {
    timestamp
        .and_utc()
        .to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
