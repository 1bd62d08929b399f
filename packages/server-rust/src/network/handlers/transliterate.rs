//! Transliteration endpoints.
//!
//! Every operation gets a dedicated route under `/transliterate/` that
//! accepts `POST {"text": ...}` or `GET ?text=...`. A generic
//! `POST /transliterate?transliteration_type=<id>` covers the same set by
//! identifier. All of them end in [`RequestDispatcher::dispatch`](crate::service::RequestDispatcher::dispatch).

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use transliterate_core::{
    route_for, ErrorBody, OperationDescriptor, OperationRegistry, TransliterationRequest,
    TransliterationResult, ROUTE_PREFIX,
};
use utoipa::IntoParams;

use super::AppState;
use crate::service::FailureRecord;

type Outcome = Result<Json<TransliterationResult>, FailureRecord>;

/// Query string of the dedicated `GET` routes.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TextQuery {
    /// Text to transliterate.
    pub text: String,
}

/// Query string of the generic route.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OperationQuery {
    /// Operation identifier, e.g. `Gurmukhi2Shahmukhi`.
    pub transliteration_type: String,
}

/// Dedicated routes for every operation in `registry`, plus the generic
/// route with and without a trailing slash.
pub fn transliteration_routes(registry: &'static OperationRegistry) -> Router<AppState> {
    let generic = post(transliterate_generic_handler);

    registry
        .list()
        .iter()
        .fold(Router::new(), |router, descriptor| {
            router.route(
                &route_for(descriptor),
                post(
                    move |state: State<AppState>,
                          body: Result<Json<TransliterationRequest>, JsonRejection>| {
                        transliterate_post_handler(state, descriptor, body)
                    },
                )
                .get(
                    move |state: State<AppState>,
                          query: Result<Query<TextQuery>, QueryRejection>| {
                        transliterate_get_handler(state, descriptor, query)
                    },
                ),
            )
        })
        .route(ROUTE_PREFIX, generic.clone())
        .route(&format!("{ROUTE_PREFIX}/"), generic)
}

/// Runs the route's operation on the JSON body.
#[utoipa::path(
    post,
    path = "/transliterate/{route_name}",
    tag = "transliteration",
    params(("route_name" = String, Path, description = "Public operation name, e.g. GurmukhiToShahmukhi")),
    request_body = TransliterationRequest,
    responses(
        (status = 200, description = "Transliterated text", body = TransliterationResult),
        (status = 413, description = "Body exceeds the size cap", body = ErrorBody),
        (status = 422, description = "Body is not `{\"text\": string}`", body = ErrorBody),
        (status = 502, description = "Engine failed or is unreachable", body = ErrorBody),
    )
)]
pub async fn transliterate_post_handler(
    State(state): State<AppState>,
    descriptor: &'static OperationDescriptor,
    body: Result<Json<TransliterationRequest>, JsonRejection>,
) -> Outcome {
    let Json(request) = body.map_err(body_failure)?;
    run(&state, descriptor.identifier(), &request.text).await
}

/// Runs the route's operation on the `text` query parameter.
#[utoipa::path(
    get,
    path = "/transliterate/{route_name}",
    tag = "transliteration",
    params(
        ("route_name" = String, Path, description = "Public operation name, e.g. GurmukhiToShahmukhi"),
        TextQuery,
    ),
    responses(
        (status = 200, description = "Transliterated text", body = TransliterationResult),
        (status = 422, description = "Missing `text` parameter", body = ErrorBody),
        (status = 502, description = "Engine failed or is unreachable", body = ErrorBody),
    )
)]
pub async fn transliterate_get_handler(
    State(state): State<AppState>,
    descriptor: &'static OperationDescriptor,
    query: Result<Query<TextQuery>, QueryRejection>,
) -> Outcome {
    let Query(query) = query.map_err(|rejection| FailureRecord::invalid_request(rejection.body_text()))?;
    run(&state, descriptor.identifier(), &query.text).await
}

/// Runs the operation named by `transliteration_type` on the JSON body.
#[utoipa::path(
    post,
    path = "/transliterate",
    tag = "transliteration",
    params(OperationQuery),
    request_body = TransliterationRequest,
    responses(
        (status = 200, description = "Transliterated text", body = TransliterationResult),
        (status = 400, description = "Unknown transliteration type", body = ErrorBody),
        (status = 413, description = "Body exceeds the size cap", body = ErrorBody),
        (status = 422, description = "Missing query parameter or malformed body", body = ErrorBody),
        (status = 502, description = "Engine failed or is unreachable", body = ErrorBody),
    )
)]
pub async fn transliterate_generic_handler(
    State(state): State<AppState>,
    query: Result<Query<OperationQuery>, QueryRejection>,
    body: Result<Json<TransliterationRequest>, JsonRejection>,
) -> Outcome {
    let Query(query) = query.map_err(|rejection| FailureRecord::invalid_request(rejection.body_text()))?;
    let Json(request) = body.map_err(body_failure)?;
    run(&state, &query.transliteration_type, &request.text).await
}

/// A body cut off by the size cap is reported as too large; every other
/// rejection is an invalid request.
#[allow(clippy::needless_pass_by_value)]
fn body_failure(rejection: JsonRejection) -> FailureRecord {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        FailureRecord::payload_too_large()
    } else {
        FailureRecord::invalid_request(rejection.body_text())
    }
}

async fn run(state: &AppState, operation: &str, text: &str) -> Outcome {
    let _in_flight = state.shutdown.in_flight_guard();
    state.dispatcher.dispatch(operation, text).await.map(Json)
}
