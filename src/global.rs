//! Process-wide default client.
//!
//! Lazily builds one shared [`LogClient`] and rebuilds it after the default
//! options change. Applications that can pass a client around explicitly
//! should prefer doing so.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::client::LogClient;
use crate::env::{env_or, DEFAULT_PROJECT, XRAY_PROJECT_ENV};
use crate::error::LogDeliveryError;
use crate::host::ClientOptions;
use crate::payload::Payload;

#[derive(Default)]
struct DefaultState {
    options: ClientOptions,
    client: Option<Arc<LogClient>>,
}

static DEFAULT: Lazy<RwLock<DefaultState>> = Lazy::new(|| RwLock::new(DefaultState::default()));

/// Shared client, built on first use with the current default options.
///
/// Its project is `XRAY_PROJECT` if set, `"default"` otherwise.
pub fn default_client() -> Arc<LogClient> {
    if let Some(client) = &DEFAULT.read().client {
        return Arc::clone(client);
    }

    let mut state = DEFAULT.write();
    let options = state.options;
    let client = state.client.get_or_insert_with(|| {
        Arc::new(LogClient::with_options(
            env_or(XRAY_PROJECT_ENV, DEFAULT_PROJECT),
            options,
        ))
    });
    Arc::clone(client)
}

/// Replace the default options. The cached client is dropped and the next
/// call builds a new one.
pub fn set_default_options(options: ClientOptions) {
    let mut state = DEFAULT.write();
    state.options = options;
    state.client = None;
}

/// Restore [`ClientOptions::default`] and drop the cached client.
pub fn reset_default() {
    set_default_options(ClientOptions::default());
}

/// Log through the shared client, see [`LogClient::log`].
pub async fn xray<L, P>(level: L, payload: P) -> Result<(), LogDeliveryError>
where
    L: AsRef<str>,
    P: Into<Payload>,
{
    default_client().log(level, payload).await
}

/// Log through the shared client at info level.
pub async fn xray_payload<P: Into<Payload>>(payload: P) -> Result<(), LogDeliveryError> {
    default_client().log_payload(payload).await
}
