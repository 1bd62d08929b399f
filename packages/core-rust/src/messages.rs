//! Wire types for the public API and for the upstream engine.
//!
//! The public side speaks `{"text": ...}` in and `{"result": ...}` out.
//! The upstream side takes `{"input": ...}` and answers with an envelope
//! `{"d": ...}` that must be unwrapped.

use serde::{Deserialize, Serialize};

/// Local request body.
///
/// `text` may be empty and is forwarded untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TransliterationRequest {
    pub text: String,
}

/// Local success body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TransliterationResult {
    pub result: String,
}

/// Local failure body. `detail` is always a client-safe message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorBody {
    pub detail: String,
}

/// Body sent to the upstream engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpstreamRequest<'a> {
    pub input: &'a str,
}

/// The upstream response wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpstreamEnvelope {
    pub d: String,
}

impl UpstreamEnvelope {
    /// Parses a 200 response body and returns the inner `d` string.
    ///
    /// Invalid JSON, a missing `d`, and a non-string `d` are all reported
    /// as the same error; there is no silent default.
    pub fn unwrap_body(body: &[u8]) -> Result<String, serde_json::Error> {
        serde_json::from_slice::<Self>(body).map(|envelope| envelope.d)
    }
}
