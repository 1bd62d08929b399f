//! `GET /`: the list of available transliteration routes.

use axum::extract::State;
use axum::Json;
use transliterate_core::DiscoveryResponse;

use super::AppState;

/// Lists every operation with its dedicated route and description.
#[utoipa::path(
    get,
    path = "/",
    tag = "discovery",
    responses((status = 200, description = "Available transliteration routes", body = DiscoveryResponse))
)]
pub async fn discovery_handler(State(state): State<AppState>) -> Json<DiscoveryResponse> {
    Json(DiscoveryResponse::from_registry(state.dispatcher.registry()))
}
