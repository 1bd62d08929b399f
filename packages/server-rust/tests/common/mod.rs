//! Shared helpers: a stub Sangam engine and a gateway router pointed at it.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Json, Path};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use transliterate_core::OperationRegistry;
use transliterate_server::{
    HttpUpstream, NetworkConfig, NetworkModule, RequestDispatcher, UpstreamConfig,
};

/// Stub engine keyed on the input text:
/// - `"fail"` answers 500 with an ASP.NET-style error body
/// - `"garbage"` answers 200 without a `d` field
/// - anything else answers `{"d": "<segment>|<input reversed>"}`
pub fn stub_engine() -> Router {
    Router::new().route(
        "/{segment}",
        post(|Path(segment): Path<String>, Json(body): Json<Value>| async move {
            let input = body["input"].as_str().unwrap_or_default().to_string();
            let response: Response = match input.as_str() {
                "fail" => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "Message": "System.NullReferenceException at Sangam" })),
                )
                    .into_response(),
                "garbage" => Json(json!({ "result": "nope" })).into_response(),
                _ => {
                    let reversed: String = input.chars().rev().collect();
                    Json(json!({ "d": format!("{segment}|{reversed}") })).into_response()
                }
            };
            response
        }),
    )
}

pub async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Full gateway router, middleware included, talking to `base_url`.
pub fn gateway(base_url: String) -> Router {
    let upstream = HttpUpstream::new(UpstreamConfig {
        base_url,
        timeout: Duration::from_secs(5),
        ..UpstreamConfig::default()
    })
    .unwrap();
    let dispatcher = RequestDispatcher::new(OperationRegistry::builtin(), Arc::new(upstream));
    NetworkModule::new(NetworkConfig::default(), Arc::new(dispatcher)).build_router()
}
