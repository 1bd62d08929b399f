//! `GET /openapi.json`.

use axum::Json;
use utoipa::OpenApi;

use super::{discovery, transliterate};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Transliteration API",
        version = "1.0.0",
        description = "HTTP gateway to the Sangam transliteration engine: Gurmukhi, Shahmukhi, Sindhi, Hindi and Urdu script conversion."
    ),
    paths(
        discovery::discovery_handler,
        transliterate::transliterate_post_handler,
        transliterate::transliterate_get_handler,
        transliterate::transliterate_generic_handler,
    ),
    components(schemas(
        transliterate_core::DiscoveryResponse,
        transliterate_core::RouteInfo,
        transliterate_core::TransliterationRequest,
        transliterate_core::TransliterationResult,
        transliterate_core::ErrorBody,
    )),
    tags(
        (name = "discovery", description = "Available operations"),
        (name = "transliteration", description = "Script conversion"),
    )
)]
pub struct ApiDoc;

pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
