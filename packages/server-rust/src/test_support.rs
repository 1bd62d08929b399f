//! Stub upstream servers for unit tests.

use axum::extract::Json;
use axum::routing::post;
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Serves `router` on an ephemeral local port and returns its base URL.
pub(crate) async fn spawn_stub(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A base URL nothing is listening on.
pub(crate) async fn refused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Deterministic engine: answers every operation with `{"d": <input reversed>}`.
pub(crate) fn reversing_upstream() -> Router {
    Router::new().route(
        "/{segment}",
        post(|Json(body): Json<Value>| async move {
            let input = body["input"].as_str().unwrap_or_default();
            Json(json!({ "d": input.chars().rev().collect::<String>() }))
        }),
    )
}
