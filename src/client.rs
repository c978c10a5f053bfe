use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::error::LogDeliveryError;
use crate::host::{ClientOptions, HostKind};
use crate::payload::{format_payload, ErrorInfo, Payload};
use crate::record::LogRecord;
use crate::trace;
use crate::transport::{HttpRequest, Transport, JSON_CONTENT_TYPE};

/// `tracing` target of the local echo of every record.
pub const LOG_TARGET: &str = "xray_log_client";

/// Path on the collector that accepts records.
const RECEIVE_PATH: &str = "/receive";

/// The four levels with dedicated helpers. Any other string is accepted by
/// [`LogClient::log`] too and is simply uppercased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Info,
    Error,
    Warning,
    Debug,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Debug => "debug",
        }
    }
}

impl AsRef<str> for Level {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client that posts one [`LogRecord`] per call to the collector.
///
/// The client is `Send + Sync`; share it behind an `Arc` to log from many
/// tasks. [`LogClient::set_project`] takes `&self` and is seen by every call
/// that builds its record afterwards.
pub struct LogClient {
    project: RwLock<String>,
    host_kind: HostKind,
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl LogClient {
    /// Client for a local collector, posting through `reqwest`.
    #[cfg(feature = "http")]
    pub fn new(project: impl Into<String>) -> Self {
        Self::with_options(project, ClientOptions::default())
    }

    #[cfg(feature = "http")]
    pub fn with_options(project: impl Into<String>, options: ClientOptions) -> Self {
        Self::with_transport(
            project,
            options,
            Arc::new(crate::transport::ReqwestTransport::new()),
        )
    }

    /// Construct a client with a custom [`Transport`]. No I/O happens here.
    pub fn with_transport(
        project: impl Into<String>,
        options: ClientOptions,
        transport: Arc<dyn Transport>,
    ) -> Self {
        LogClient {
            project: RwLock::new(project.into()),
            host_kind: options.host_kind,
            base_url: options.host_kind.base_url(),
            transport,
        }
    }

    /// Current project name.
    pub fn project(&self) -> String {
        self.project.read().clone()
    }

    pub fn set_project(&self, project: impl Into<String>) {
        *self.project.write() = project.into();
    }

    pub fn host_kind(&self) -> HostKind {
        self.host_kind
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base_url}/receive`
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, RECEIVE_PATH)
    }

    /// Send `payload` at `level`.
    ///
    /// The record is echoed through `tracing` before the request is made,
    /// whatever the outcome. Exactly one request is attempted.
    ///
    /// **Errors**
    /// - [`LogDeliveryError::Transport`] if no response could be obtained.
    /// - [`LogDeliveryError::Rejected`] if the collector answered non-2xx;
    ///   the message carries the response body.
    pub async fn log<L, P>(&self, level: L, payload: P) -> Result<(), LogDeliveryError>
    where
        L: AsRef<str>,
        P: Into<Payload>,
    {
        let record = self.record(level.as_ref(), payload.into());
        self.deliver(&record).await
    }

    /// Send `payload` at info level.
    pub async fn log_payload<P: Into<Payload>>(&self, payload: P) -> Result<(), LogDeliveryError> {
        self.log(Level::Info, payload).await
    }

    pub async fn info<P: Into<Payload>>(&self, payload: P) -> Result<(), LogDeliveryError> {
        self.log(Level::Info, payload).await
    }

    pub async fn error<P: Into<Payload>>(&self, payload: P) -> Result<(), LogDeliveryError> {
        self.log(Level::Error, payload).await
    }

    pub async fn warning<P: Into<Payload>>(&self, payload: P) -> Result<(), LogDeliveryError> {
        self.log(Level::Warning, payload).await
    }

    pub async fn debug<P: Into<Payload>>(&self, payload: P) -> Result<(), LogDeliveryError> {
        self.log(Level::Debug, payload).await
    }

    /// Send `err` at error level, flattened with [`ErrorInfo::from_error`].
    pub async fn log_error<E>(&self, err: &E) -> Result<(), LogDeliveryError>
    where
        E: std::error::Error + ?Sized,
    {
        let info = ErrorInfo::from_error(err);
        self.log(Level::Error, info).await
    }

    fn record(&self, level: &str, payload: Payload) -> LogRecord {
        LogRecord {
            level: level.to_uppercase(),
            payload: format_payload(payload),
            trace: trace::capture(),
            project: self.project(),
            timestamp: Utc::now().timestamp(),
        }
    }

    async fn deliver(&self, record: &LogRecord) -> Result<(), LogDeliveryError> {
        info!(
            target: LOG_TARGET,
            record_level = %record.level,
            project = %record.project,
            timestamp = record.timestamp,
            payload = %record.payload,
            trace = %record.trace,
            "log record"
        );

        let request = HttpRequest {
            url: self.endpoint(),
            content_type: JSON_CONTENT_TYPE,
            body: record.to_json()?,
        };

        let response = match self.transport.post(&request).await {
            Ok(response) => response,
            Err(source) => {
                warn!(target: LOG_TARGET, url = %request.url, error = %source, "log delivery failed");
                return Err(LogDeliveryError::Transport { source });
            }
        };

        if !response.is_success() {
            warn!(
                target: LOG_TARGET,
                url = %request.url,
                status = response.status,
                "collector rejected log record"
            );
            return Err(LogDeliveryError::Rejected {
                status: response.status,
                body: response.body,
            });
        }

        Ok(())
    }
}

impl fmt::Debug for LogClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogClient")
            .field("project", &*self.project.read())
            .field("host_kind", &self.host_kind)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::transport::HttpResponse;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use rstest::rstest;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use tracing_subscriber::Registry;

    /// Records every request and answers with a fixed response.
    struct MockTransport {
        requests: Mutex<Vec<HttpRequest>>,
        response: Result<HttpResponse, String>,
    }

    impl MockTransport {
        fn ok() -> Arc<Self> {
            Self::answering(Ok(HttpResponse::new(200, "")))
        }

        fn answering(response: Result<HttpResponse, String>) -> Arc<Self> {
            Arc::new(MockTransport {
                requests: Mutex::new(Vec::new()),
                response,
            })
        }

        fn last_request(&self) -> HttpRequest {
            self.requests.lock().last().cloned().expect("no request sent")
        }

        fn last_body(&self) -> Value {
            serde_json::from_str(&self.last_request().body).expect("body is json")
        }

        fn count(&self) -> usize {
            self.requests.lock().len()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn post(&self, request: &HttpRequest) -> Result<HttpResponse, BoxError> {
            self.requests.lock().push(request.clone());
            self.response.clone().map_err(BoxError::from)
        }
    }

    fn client_with(transport: Arc<MockTransport>) -> LogClient {
        LogClient::with_transport("test-project", ClientOptions::default(), transport)
    }

    #[test]
    fn constructor_resolves_host() {
        let local = client_with(MockTransport::ok());
        assert_eq!(local.project(), "test-project");
        assert_eq!(local.host_kind(), HostKind::Local);
        assert_eq!(local.base_url(), "http://localhost:44827");

        let docker = LogClient::with_transport(
            "test-project",
            ClientOptions::new(HostKind::Docker),
            MockTransport::ok(),
        );
        assert_eq!(docker.host_kind(), HostKind::Docker);
        assert_eq!(docker.base_url(), "http://host.docker.internal:44827");
        assert_eq!(docker.endpoint(), "http://host.docker.internal:44827/receive");
    }

    #[test]
    fn empty_project_is_accepted() {
        let client = LogClient::with_transport("", ClientOptions::default(), MockTransport::ok());
        assert_eq!(client.project(), "");
    }

    #[tokio::test]
    async fn log_sends_correct_request_format() {
        let transport = MockTransport::ok();
        let client = client_with(transport.clone());

        client.log("info", json!({ "test": "data" })).await.unwrap();

        let request = transport.last_request();
        assert_eq!(request.url, "http://localhost:44827/receive");
        assert_eq!(request.content_type, "application/json");

        let body = transport.last_body();
        let obj = body.as_object().unwrap();
        assert_eq!(obj.len(), 5);
        assert_eq!(obj["level"], json!("INFO"));
        assert_eq!(obj["payload"], json!({ "test": "data" }));
        assert_eq!(obj["project"], json!("test-project"));
        assert!(obj["timestamp"].is_i64());
        assert!(obj["trace"].is_string());
    }

    #[tokio::test]
    async fn single_argument_log_defaults_to_info() {
        let transport = MockTransport::ok();
        let client = client_with(transport.clone());

        client.log_payload("hello").await.unwrap();

        let body = transport.last_body();
        assert_eq!(body["level"], json!("INFO"));
        assert_eq!(body["payload"], json!("hello"));
    }

    #[rstest]
    #[case(Level::Info, "INFO")]
    #[case(Level::Error, "ERROR")]
    #[case(Level::Warning, "WARNING")]
    #[case(Level::Debug, "DEBUG")]
    #[tokio::test]
    async fn leveled_helpers_set_level(#[case] level: Level, #[case] expected: &str) {
        let transport = MockTransport::ok();
        let client = client_with(transport.clone());
        let payload = json!({ "message": format!("{level} test") });

        match level {
            Level::Info => client.info(payload).await,
            Level::Error => client.error(payload).await,
            Level::Warning => client.warning(payload).await,
            Level::Debug => client.debug(payload).await,
        }
        .unwrap();

        let body = transport.last_body();
        assert_eq!(body["level"], json!(expected));
        assert_eq!(body["project"], json!("test-project"));
    }

    #[tokio::test]
    async fn custom_levels_are_uppercased() {
        let transport = MockTransport::ok();
        let client = client_with(transport.clone());

        client.log("audit", 1).await.unwrap();

        assert_eq!(transport.last_body()["level"], json!("AUDIT"));
    }

    #[tokio::test]
    async fn set_project_applies_to_later_calls() {
        let transport = MockTransport::ok();
        let client = client_with(transport.clone());

        client.set_project("new-project");
        assert_eq!(client.project(), "new-project");

        client.warning("disk almost full").await.unwrap();
        assert_eq!(transport.last_body()["project"], json!("new-project"));
    }

    #[tokio::test]
    async fn error_response_carries_body_text() {
        let transport = MockTransport::answering(Ok(HttpResponse::new(500, "Server Error")));
        let client = client_with(transport.clone());

        let err = client.log("error", json!({ "test": "error" })).await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to send log: Server Error");
        assert_eq!(err.status(), Some(500));
        assert_eq!(transport.count(), 1);
    }

    #[tokio::test]
    async fn transport_failure_carries_its_message() {
        let transport = MockTransport::answering(Err("connection refused".to_string()));
        let client = client_with(transport.clone());

        let err = client.info("boom").await.unwrap_err();

        assert!(matches!(err, LogDeliveryError::Transport { .. }));
        assert_eq!(err.to_string(), "Failed to send log: connection refused");
        assert_eq!(transport.count(), 1, "failures are not retried");
    }

    #[tokio::test]
    async fn body_round_trips_inputs() {
        let transport = MockTransport::ok();
        let client = client_with(transport.clone());
        let payload = json!({ "user": 42, "tags": ["a", "b"], "ok": false });

        client.log("debug", payload.clone()).await.unwrap();

        let record: LogRecord = serde_json::from_str(&transport.last_request().body).unwrap();
        assert_eq!(record.level, "DEBUG");
        assert_eq!(record.project, "test-project");
        assert_eq!(record.payload, payload);
        assert!(record.timestamp > 0);
    }

    #[tokio::test]
    async fn log_error_flattens_the_error() {
        let transport = MockTransport::ok();
        let client = client_with(transport.clone());
        let err = "not a number".parse::<i32>().unwrap_err();

        client.log_error(&err).await.unwrap();

        let body = transport.last_body();
        assert_eq!(body["level"], json!("ERROR"));
        assert_eq!(body["payload"]["name"], json!("ParseIntError"));
        assert_eq!(body["payload"]["message"], json!(err.to_string()));
        assert!(body["payload"]["stack"].as_str().unwrap().starts_with("ParseIntError: "));
        assert!(body["payload"].get("code").is_none());
    }

    #[tokio::test]
    async fn error_info_with_code_is_sent_verbatim() {
        let transport = MockTransport::ok();
        let client = client_with(transport.clone());
        let info = ErrorInfo::new("HttpError", "upstream timeout", "HttpError: upstream timeout")
            .with_code(504)
            .with_details(json!({ "upstream": "payments" }));

        client.error(info).await.unwrap();

        let payload = &transport.last_body()["payload"];
        assert_eq!(payload["code"], json!(504));
        assert_eq!(payload["details"], json!({ "upstream": "payments" }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_calls_are_independent() {
        let transport = MockTransport::ok();
        let client = Arc::new(client_with(transport.clone()));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let client = Arc::clone(&client);
                tokio::spawn(async move { client.info(json!({ "i": i })).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(transport.count(), 16);
        let mut seen: Vec<i64> = transport
            .requests
            .lock()
            .iter()
            .map(|r| serde_json::from_str::<Value>(&r.body).unwrap()["payload"]["i"].as_i64().unwrap())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..16).collect::<Vec<i64>>());
    }

    /// Counts local echoes of records.
    struct EchoCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for EchoCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let meta = event.metadata();
            if meta.target() == LOG_TARGET && *meta.level() == tracing::Level::INFO {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    /// Fails every request after noting how many echoes preceded it.
    struct ProbeTransport {
        echoes: Arc<AtomicUsize>,
        echoes_at_send: AtomicUsize,
    }

    #[async_trait]
    impl Transport for ProbeTransport {
        async fn post(&self, _request: &HttpRequest) -> Result<HttpResponse, BoxError> {
            self.echoes_at_send
                .store(self.echoes.load(Ordering::SeqCst), Ordering::SeqCst);
            Err("network unreachable".into())
        }
    }

    #[tokio::test]
    async fn record_is_echoed_locally_before_delivery() {
        let echoes = Arc::new(AtomicUsize::new(0));
        let subscriber = Registry::default().with(EchoCounter(Arc::clone(&echoes)));
        let _guard = tracing::subscriber::set_default(subscriber);

        let probe = Arc::new(ProbeTransport {
            echoes: Arc::clone(&echoes),
            echoes_at_send: AtomicUsize::new(0),
        });
        let client =
            LogClient::with_transport("test-project", ClientOptions::default(), probe.clone());

        let err = client.info("still echoed").await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to send log: network unreachable");
        assert_eq!(probe.echoes_at_send.load(Ordering::SeqCst), 1);
        assert_eq!(echoes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn trace_starts_below_the_client() {
        let transport = MockTransport::ok();
        let client = client_with(transport.clone());

        client.info("where am I").await.unwrap();

        let trace = transport.last_body()["trace"].as_str().unwrap().to_string();
        assert!(!trace.contains("std::backtrace::Backtrace::create"));
        assert!(!trace.contains("LogClient::record"));
        assert!(trace.lines().all(|line| line == line.trim()));
    }
}
