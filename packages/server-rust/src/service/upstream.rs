//! Adapter for the external transliteration engine.
//!
//! One call = one `POST <base>/<segment>` with `{"input": text}` and the
//! fixed header set the engine expects. A 200 response is unwrapped from its
//! `{"d": ...}` envelope; everything else becomes an [`UpstreamFailure`].

use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT,
};
use reqwest::StatusCode;
use tracing::{debug, warn};
use transliterate_core::{UpstreamEnvelope, UpstreamRequest};

use super::config::UpstreamConfig;

/// Longest slice of an upstream error body kept for logs.
const BODY_EXCERPT_CHARS: usize = 256;

/// Bytes read from an error body before giving up on the rest. Enough for
/// [`BODY_EXCERPT_CHARS`] of four-byte UTF-8.
const BODY_EXCERPT_BYTES: usize = BODY_EXCERPT_CHARS * 4;

/// Everything that can go wrong talking to the upstream engine.
///
/// The detail in these variants is for logs only; the dispatcher decides
/// what the client sees.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamFailure {
    /// The engine answered with a status other than 200.
    #[error("upstream returned HTTP {status}")]
    Status { status: u16, body_excerpt: String },
    /// No complete answer arrived within the configured timeout.
    #[error("upstream call timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    /// Connection refused, DNS, TLS, or a broken connection mid-response.
    #[error("upstream transport error: {message}")]
    Transport { message: String },
    /// A 200 whose body is not a `{"d": "<string>"}` envelope.
    #[error("upstream response violates the envelope contract: {reason}")]
    MalformedResponse { reason: String },
    /// The request could not be built locally.
    #[error("could not build upstream request: {message}")]
    Request { message: String },
}

impl UpstreamFailure {
    /// Upstream HTTP status, when the engine produced one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for failures where the engine was never reached or never answered.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Transport { .. })
    }
}

/// Seam between the dispatcher and whatever performs the upstream call.
#[async_trait]
pub trait UpstreamPort: Send + Sync {
    /// Sends `text` to the operation at `path_segment` and returns the
    /// unwrapped result.
    async fn call(&self, path_segment: &str, text: &str) -> Result<String, UpstreamFailure>;
}

/// Production [`UpstreamPort`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
    config: UpstreamConfig,
}

impl HttpUpstream {
    /// Builds the shared client: fixed headers, per-call timeout, bounded pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(config: UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .default_headers(fixed_headers())
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    async fn call_once(&self, url: &str, body: Vec<u8>) -> Result<String, UpstreamFailure> {
        let response = self
            .client
            .post(url)
            .body(body)
            .send()
            .await
            .map_err(|e| self.transport_failure(&e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(UpstreamFailure::Status {
                status: status.as_u16(),
                body_excerpt: body_excerpt(response).await,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_failure(&e))?;

        UpstreamEnvelope::unwrap_body(&bytes).map_err(|e| UpstreamFailure::MalformedResponse {
            reason: e.to_string(),
        })
    }

    fn transport_failure(&self, err: &reqwest::Error) -> UpstreamFailure {
        if err.is_timeout() {
            UpstreamFailure::Timeout {
                timeout_ms: u64::try_from(self.config.timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            UpstreamFailure::Transport {
                message: error_chain(err),
            }
        }
    }
}

/// Reads at most [`BODY_EXCERPT_BYTES`] of an error body and keeps the first
/// [`BODY_EXCERPT_CHARS`] characters. Read errors end the excerpt early.
async fn body_excerpt(mut response: reqwest::Response) -> String {
    let mut head = Vec::with_capacity(BODY_EXCERPT_BYTES.min(8 * 1024));
    while head.len() < BODY_EXCERPT_BYTES {
        match response.chunk().await {
            Ok(Some(chunk)) => head.extend_from_slice(&chunk),
            Ok(None) | Err(_) => break,
        }
    }
    head.truncate(BODY_EXCERPT_BYTES);
    String::from_utf8_lossy(&head)
        .chars()
        .take(BODY_EXCERPT_CHARS)
        .collect()
}

#[async_trait]
impl UpstreamPort for HttpUpstream {
    async fn call(&self, path_segment: &str, text: &str) -> Result<String, UpstreamFailure> {
        let url = self.config.endpoint(path_segment);
        let body = serde_json::to_vec(&UpstreamRequest { input: text }).map_err(|e| {
            UpstreamFailure::Request {
                message: e.to_string(),
            }
        })?;

        let mut attempt: u8 = 0;
        loop {
            debug!(url = %url, attempt, "calling upstream");
            match self.call_once(&url, body.clone()).await {
                Err(failure) if failure.is_transport() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let delay = self.config.retry_delay(attempt);
                    warn!(
                        url = %url,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %failure,
                        "retrying upstream call"
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }
}

/// Header set the engine requires from every client.
fn fixed_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static("Wikimedia Toolforge transliteration service"),
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/javascript, */*; q=0.01"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    headers.insert(
        HeaderName::from_static("x-requested-with"),
        HeaderValue::from_static("XMLHttpRequest"),
    );
    headers
}

/// Flattens an error and its sources into one log line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use axum::extract::Path;
    use axum::http::HeaderMap as AxumHeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::test_support::{refused_base_url, reversing_upstream, spawn_stub};

    fn upstream_for(base_url: String) -> HttpUpstream {
        HttpUpstream::new(UpstreamConfig {
            base_url,
            timeout: Duration::from_millis(300),
            retry_base_delay: Duration::from_millis(10),
            ..UpstreamConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn unwraps_envelope_on_success() {
        let base = spawn_stub(reversing_upstream()).await;
        let upstream = upstream_for(base);
        let result = upstream.call("Gurmukhi2Shahmukhi", "abc").await.unwrap();
        assert_eq!(result, "cba");
    }

    #[tokio::test]
    async fn passes_text_through_untouched() {
        let base = spawn_stub(reversing_upstream()).await;
        let upstream = upstream_for(base);
        assert_eq!(upstream.call("Hindi2Urdu", "").await.unwrap(), "");
        assert_eq!(
            upstream.call("Hindi2Urdu", "\"ਸਤ\"\n").await.unwrap(),
            "\n\"ਤਸ\""
        );
    }

    #[tokio::test]
    async fn sends_fixed_headers_to_the_operation_path() {
        let router = Router::new().route(
            "/{segment}",
            post(|Path(segment): Path<String>, headers: AxumHeaderMap| async move {
                let header = |name: &str| {
                    headers
                        .get(name)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string()
                };
                Json(json!({
                    "d": format!(
                        "{segment}|{}|{}|{}|{}|{}",
                        header("user-agent"),
                        header("accept"),
                        header("accept-language"),
                        header("content-type"),
                        header("x-requested-with"),
                    )
                }))
            }),
        );
        let base = spawn_stub(router).await;
        let result = upstream_for(base).call("Urdu2Hindi", "x").await.unwrap();
        assert_eq!(
            result,
            "Urdu2Hindi|Wikimedia Toolforge transliteration service|\
             application/json, text/javascript, */*; q=0.01|en-US,en;q=0.5|\
             application/json; charset=utf-8|XMLHttpRequest"
        );
    }

    #[tokio::test]
    async fn body_uses_input_key() {
        let router = Router::new().route(
            "/{segment}",
            post(|Json(body): Json<Value>| async move {
                Json(json!({ "d": body.to_string() }))
            }),
        );
        let base = spawn_stub(router).await;
        let result = upstream_for(base).call("Hindi2Urdu", "नमस्ते").await.unwrap();
        assert_eq!(result, r#"{"input":"नमस्ते"}"#);
    }

    #[tokio::test]
    async fn non_200_status_is_reported_with_code() {
        let router = Router::new().route(
            "/{segment}",
            post(|| async { (axum::http::StatusCode::SERVICE_UNAVAILABLE, "down for maintenance") }),
        );
        let base = spawn_stub(router).await;
        let err = upstream_for(base).call("Hindi2Urdu", "x").await.unwrap_err();
        assert_eq!(
            err,
            UpstreamFailure::Status {
                status: 503,
                body_excerpt: "down for maintenance".to_string(),
            }
        );
        assert_eq!(err.status(), Some(503));
        assert!(!err.is_transport());
    }

    #[tokio::test]
    async fn huge_error_body_is_cut_to_an_excerpt() {
        let router = Router::new().route(
            "/{segment}",
            post(|| async {
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "é".repeat(512 * 1024),
                )
            }),
        );
        let base = spawn_stub(router).await;
        let err = upstream_for(base).call("Hindi2Urdu", "x").await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        let UpstreamFailure::Status { body_excerpt, .. } = err else {
            unreachable!("status() is only set for Status failures");
        };
        assert_eq!(body_excerpt.chars().count(), BODY_EXCERPT_CHARS);
        assert!(body_excerpt.chars().all(|c| c == 'é'));
    }

    #[tokio::test]
    async fn other_2xx_statuses_are_not_success() {
        let router = Router::new().route(
            "/{segment}",
            post(|| async { (axum::http::StatusCode::CREATED, Json(json!({ "d": "x" }))) }),
        );
        let base = spawn_stub(router).await;
        let err = upstream_for(base).call("Hindi2Urdu", "x").await.unwrap_err();
        assert_eq!(err.status(), Some(201));
    }

    #[tokio::test]
    async fn missing_d_is_malformed() {
        let router = Router::new().route(
            "/{segment}",
            post(|| async { Json(json!({ "notD": "x" })) }),
        );
        let base = spawn_stub(router).await;
        let err = upstream_for(base).call("Hindi2Urdu", "x").await.unwrap_err();
        assert!(matches!(err, UpstreamFailure::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let router = Router::new().route("/{segment}", post(|| async { "<html></html>" }));
        let base = spawn_stub(router).await;
        let err = upstream_for(base).call("Hindi2Urdu", "x").await.unwrap_err();
        assert!(matches!(err, UpstreamFailure::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn stalled_upstream_times_out() {
        let router = Router::new().route(
            "/{segment}",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({ "d": "late" }))
            }),
        );
        let base = spawn_stub(router).await;
        let started = Instant::now();
        let err = upstream_for(base).call("Hindi2Urdu", "x").await.unwrap_err();
        assert_eq!(err, UpstreamFailure::Timeout { timeout_ms: 300 });
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn refused_connection_is_transport_failure() {
        let base = refused_base_url().await;
        let err = upstream_for(base).call("Hindi2Urdu", "x").await.unwrap_err();
        assert!(matches!(err, UpstreamFailure::Transport { .. }));
        assert!(err.is_transport());
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn retries_transport_failures_when_enabled() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let router = Router::new().route(
            "/{segment}",
            post(move || {
                let counter = Arc::clone(&counter);
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        tokio::time::sleep(Duration::from_secs(5)).await;
                    }
                    Json(json!({ "d": "second time lucky" }))
                }
            }),
        );
        let base = spawn_stub(router).await;
        let upstream = HttpUpstream::new(UpstreamConfig {
            base_url: base,
            timeout: Duration::from_millis(200),
            max_retries: 1,
            retry_base_delay: Duration::from_millis(10),
            ..UpstreamConfig::default()
        })
        .unwrap();

        let result = upstream.call("Hindi2Urdu", "x").await.unwrap();
        assert_eq!(result, "second time lucky");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn status_failures_are_never_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let router = Router::new().route(
            "/{segment}",
            post(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { axum::http::StatusCode::BAD_GATEWAY }
            }),
        );
        let base = spawn_stub(router).await;
        let upstream = HttpUpstream::new(UpstreamConfig {
            base_url: base,
            max_retries: 3,
            retry_base_delay: Duration::from_millis(1),
            ..UpstreamConfig::default()
        })
        .unwrap();

        let err = upstream.call("Hindi2Urdu", "x").await.unwrap_err();
        assert_eq!(err.status(), Some(502));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn error_chain_joins_sources() {
        #[derive(Debug, thiserror::Error)]
        #[error("outer")]
        struct Outer(#[source] std::io::Error);

        let err = Outer(std::io::Error::new(std::io::ErrorKind::Other, "inner"));
        assert_eq!(error_chain(&err), "outer: inner");
    }
}
