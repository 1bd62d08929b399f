//! Transport middleware shared by every gateway route.

use std::any::Any;

use axum::extract::Request;
use axum::http::header::{self, HeaderName, HeaderValue};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any as AnyHeader, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use super::config::NetworkConfig;
use crate::service::FailureRecord;

/// Wraps `router` in the gateway's layers, listed outermost first:
///
/// - request id: reuse the caller's `x-request-id` or mint one
/// - a trace span per request
/// - panic capture, rendered as `Internal`
/// - bare 408/413 responses rewritten as `{"detail"}` failures
/// - body size cap (413)
/// - gzip
/// - CORS for `GET`/`POST`
/// - whole-request deadline, upstream call included (408)
/// - request id echoed on the response
///
/// The body cap sits outside CORS: its response body has no `Default`,
/// which the CORS preflight short-circuit needs from the inner service.
pub fn apply_http_layers<S>(router: Router<S>, config: &NetworkConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let request_id = HeaderName::from_static("x-request-id");

    let layers = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn(render_transport_failures))
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(CompressionLayer::new())
        .layer(cors_layer(&config.cors_origins))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(PropagateRequestIdLayer::new(request_id));

    router.layer(layers)
}

/// `*` anywhere in `origins` opens CORS to every origin. Entries that are
/// not valid header values are skipped.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = if origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(AnyHeader)
}

/// Gives the layer-generated 408 and 413 responses the same JSON shape as
/// every other failure. Responses that are already JSON pass through.
async fn render_transport_failures(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .is_some_and(|value| value.as_bytes().starts_with(b"application/json"));
    if is_json {
        return response;
    }
    match response.status() {
        StatusCode::PAYLOAD_TOO_LARGE => FailureRecord::payload_too_large().into_response(),
        StatusCode::REQUEST_TIMEOUT => FailureRecord::request_timeout().into_response(),
        _ => response,
    }
}

/// Renders a caught panic as an `Internal` failure. The payload is logged,
/// never returned.
#[allow(clippy::needless_pass_by_value)]
fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    error!(panic = %message, "handler panicked");
    FailureRecord::internal().into_response()
}
