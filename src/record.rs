use serde::{Deserialize, Serialize};

/// Wire payload posted to the collector, built fresh for every log call.
///
/// Serialized with exactly these five fields, in this order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Uppercased level, e.g. `INFO` or any caller-supplied string.
    pub level: String,
    /// Normalized caller value, see [`crate::payload::format_payload`].
    pub payload: serde_json::Value,
    /// Newline-joined caller frames, innermost first.
    pub trace: String,
    /// Client project at the time of the call.
    pub project: String,
    /// Unix seconds at the time of the call.
    pub timestamp: i64,
}

impl LogRecord {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
