//! Lightweight client that forwards application log events to an XRay
//! collector over HTTP.
//!
//! Each call builds one [`LogRecord`], echoes it through `tracing`, and
//! posts it as JSON to `{base_url}/receive`. There is no batching, retry
//! or queueing: a call either gets an ok response or fails with
//! [`LogDeliveryError`].
//!
//! ```no_run
//! use xray_log_client::{ClientOptions, HostKind, LogClient};
//!
//! # async fn run() -> Result<(), xray_log_client::LogDeliveryError> {
//! let client = LogClient::with_options("billing", ClientOptions::new(HostKind::Docker));
//! client.info("invoice created").await?;
//! client.error(serde_json::json!({ "invoice": 42, "reason": "declined" })).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod env;
pub mod error;
#[cfg(feature = "http")]
pub mod global;
pub mod host;
pub mod init;
pub mod payload;
pub mod record;
pub mod trace;
pub mod transport;

pub use client::{Level, LogClient};
pub use error::{HostKindParseError, LogDeliveryError};
pub use host::{ClientOptions, HostKind, COLLECTOR_PORT};
pub use payload::{format_payload, ErrorInfo, Payload};
pub use record::LogRecord;
pub use transport::{HttpRequest, HttpResponse, Transport};

#[cfg(feature = "http")]
pub use global::{default_client, reset_default, set_default_options, xray, xray_payload};
#[cfg(feature = "http")]
pub use transport::ReqwestTransport;
