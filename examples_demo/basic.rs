use xray_log_client::init::init_tracing;
use xray_log_client::{ClientOptions, ErrorInfo, LogClient};

#[tokio::main]
async fn main() {
    init_tracing();

    // Set XRAY_HOST_KIND=docker when running inside a container.
    let options = ClientOptions::from_env().expect("invalid XRAY_HOST_KIND");
    let client = LogClient::with_options("checkout", options);

    if let Err(e) = client.info("checkout service started").await {
        eprintln!("{e}");
    }

    let err = "twelve".parse::<u32>().unwrap_err();
    if let Err(e) = client.log_error(&err).await {
        eprintln!("{e}");
    }

    let declined = ErrorInfo::new("PaymentError", "card declined", "PaymentError: card declined")
        .with_code("E_DECLINED")
        .with_details(serde_json::json!({ "order": 42 }));
    if let Err(e) = client.error(declined).await {
        eprintln!("{e}");
    }

    client.set_project("checkout-worker");
    if let Err(e) = client.log("audit", serde_json::json!({ "user": 7 })).await {
        eprintln!("{e}");
    }
}
