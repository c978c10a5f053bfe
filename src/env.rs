//! Environment variable names used by this crate for convenient
//! configuration of the default client.
//!
//! These are purely helpers; [`crate::LogClient`] itself never reads the
//! environment.

/// Collector host selection: `local` or `docker`.
pub const XRAY_HOST_KIND_ENV: &str = "XRAY_HOST_KIND";

/// Project name used by the shared default client.
pub const XRAY_PROJECT_ENV: &str = "XRAY_PROJECT";

/// Project name used by the shared default client when none is configured.
pub const DEFAULT_PROJECT: &str = "default";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
