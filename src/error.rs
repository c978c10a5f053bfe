use std::error::Error;

/// Boxed error returned by [`crate::Transport`] implementations.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Failure of a single log delivery.
///
/// Every variant renders as `"Failed to send log: {detail}"`.
#[derive(thiserror::Error, Debug)]
pub enum LogDeliveryError {
    /// The collector answered with a non-success status.
    #[error("Failed to send log: {body}")]
    Rejected { status: u16, body: String },

    /// The request could not be completed (connect, DNS, body read, ...).
    #[error("Failed to send log: {source}")]
    Transport {
        #[source]
        source: BoxError,
    },

    /// The record could not be encoded as JSON.
    #[error("Failed to send log: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl LogDeliveryError {
    /// HTTP status reported by the collector, if it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            LogDeliveryError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Error returned when parsing a [`crate::HostKind`] from a string.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown host kind {0:?}, expected \"local\" or \"docker\"")]
pub struct HostKindParseError(pub String);
