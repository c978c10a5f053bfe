use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Install a global `tracing` subscriber that prints events, including the
/// local echo of every log record, to stdout.
///
/// **Panics**
///
/// If a global subscriber is already installed. Use [`try_init_tracing`]
/// when that is possible.
pub fn init_tracing() {
    try_init_tracing().expect("set global subscriber");
}

/// Like [`init_tracing`], but returns an error if a global subscriber is
/// already installed.
pub fn try_init_tracing() -> Result<(), SetGlobalDefaultError> {
    let fmt_layer = tracing_subscriber::fmt::layer();
    let subscriber = Registry::default().with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_rejected() {
        let _ = try_init_tracing();
        assert!(try_init_tracing().is_err());
    }
}
