use crate::error::ProbeError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

/// One request as handed to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
    pub verify_tls: bool,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub elapsed_ms: u64,
    pub body: String,
}

pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<TransportResponse, ProbeError>> + Send + 'a>>;

/// Pluggable HTTP backend used by the runner.
///
/// Errors are transport-level only (connect, TLS, timeout, unusable request);
/// any HTTP status, including 5xx, is a successful response.
pub trait Transport: Send + Sync {
    fn send(&self, request: OutboundRequest) -> TransportFuture<'_>;
}

pub fn build_headers(input: &BTreeMap<String, String>) -> Result<HeaderMap, ProbeError> {
    let mut headers = HeaderMap::new();

    for (key, value) in input {
        if key.is_empty() {
            continue;
        }

        let header_name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|err| ProbeError::Transport(format!("Invalid header name `{key}`: {err}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|err| ProbeError::Transport(format!("Invalid header value for `{key}`: {err}")))?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}

/// `Transport` backed by reqwest.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport;

impl ReqwestTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: OutboundRequest) -> TransportFuture<'_> {
        Box::pin(send_http_request(request))
    }
}

async fn send_http_request(request: OutboundRequest) -> Result<TransportResponse, ProbeError> {
    let method = Method::from_bytes(request.method.as_bytes())
        .map_err(|err| ProbeError::Transport(format!("Invalid HTTP method: {err}")))?;

    let headers = build_headers(&request.headers)?;

    let mut builder = Client::builder().redirect(reqwest::redirect::Policy::limited(10));

    if request.timeout_secs > 0 {
        builder = builder.timeout(Duration::from_secs(request.timeout_secs));
    }

    if !request.verify_tls {
        builder = builder.danger_accept_invalid_certs(true);
    }

    let client = builder
        .build()
        .map_err(|err| ProbeError::Transport(format!("Failed to build HTTP client: {err}")))?;

    let mut outbound = client.request(method, &request.url).headers(headers);
    if let Some(body) = request.body {
        outbound = outbound.body(body);
    }

    let start = Instant::now();
    let response = outbound.send().await.map_err(|err| ProbeError::Transport(err.to_string()))?;
    let status = response.status().as_u16();

    let bytes = response
        .bytes()
        .await
        .map_err(|err| ProbeError::Transport(format!("Failed to read response: {err}")))?;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    Ok(TransportResponse {
        status,
        elapsed_ms,
        body: String::from_utf8_lossy(&bytes).to_string(),
    })
}
