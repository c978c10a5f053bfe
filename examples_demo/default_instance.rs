use xray_log_client::init::init_tracing;
use xray_log_client::{set_default_options, xray, xray_payload, ClientOptions, HostKind};

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = xray_payload("hello from the default client").await {
        eprintln!("{e}");
    }

    // Point the shared client at the host machine from inside a container.
    set_default_options(ClientOptions::new(HostKind::Docker));
    if let Err(e) = xray("warning", "cache miss rate above 50%").await {
        eprintln!("{e}");
    }
}
