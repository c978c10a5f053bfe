use async_trait::async_trait;

use crate::error::BoxError;

/// Content type of every record posted to the collector.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A single outbound POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub content_type: &'static str,
    pub body: String,
}

/// Status and body text of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        HttpResponse { status, body: body.into() }
    }

    /// 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Asynchronous HTTP seam used by [`crate::LogClient`].
///
/// Implementations perform exactly one request per call, with no retry.
/// They return `Ok` whenever the collector answered, whatever the status,
/// and `Err` only when no complete response could be obtained (connect
/// failure, DNS failure, unreadable body, ...).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, request: &HttpRequest) -> Result<HttpResponse, BoxError>;
}

#[cfg(feature = "http")]
pub use self::reqwest_transport::ReqwestTransport;

#[cfg(feature = "http")]
mod reqwest_transport {
    use super::*;
    use reqwest::header::CONTENT_TYPE;
    use reqwest::Client;

    /// [`Transport`] backed by a shared `reqwest` client.
    ///
    /// No timeout is set; the `reqwest` defaults apply.
    #[derive(Clone, Debug, Default)]
    pub struct ReqwestTransport {
        client: Client,
    }

    impl ReqwestTransport {
        pub fn new() -> Self {
            Self::with_client(Client::new())
        }

        /// Reuse an existing client, e.g. one configured with a proxy.
        pub fn with_client(client: Client) -> Self {
            ReqwestTransport { client }
        }
    }

    #[async_trait]
    impl Transport for ReqwestTransport {
        async fn post(&self, request: &HttpRequest) -> Result<HttpResponse, BoxError> {
            let resp = self
                .client
                .post(&request.url)
                .header(CONTENT_TYPE, request.content_type)
                .body(request.body.clone())
                .send()
                .await?;

            let status = resp.status().as_u16();
            let body = resp.text().await?;
            Ok(HttpResponse { status, body })
        }
    }
}
