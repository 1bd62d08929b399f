//! Client-facing failure taxonomy and its HTTP rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use transliterate_core::ErrorBody;

/// Category of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The operation identifier is not in the registry.
    InvalidOperation,
    /// The request body or query could not be decoded.
    InvalidRequest,
    /// The request body exceeds the configured cap.
    PayloadTooLarge,
    /// The request did not finish within the request timeout.
    RequestTimeout,
    /// The engine could not be reached or did not answer in time.
    UpstreamUnreachable,
    /// The engine answered with a non-success status.
    UpstreamError,
    /// The engine answered 200 with something other than the expected envelope.
    UpstreamContractViolation,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    /// Status code clients see for this kind.
    #[must_use]
    pub fn http_status(self) -> StatusCode {
        match self {
            Self::InvalidOperation => StatusCode::BAD_REQUEST,
            Self::InvalidRequest => StatusCode::UNPROCESSABLE_ENTITY,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            Self::UpstreamUnreachable | Self::UpstreamError | Self::UpstreamContractViolation => {
                StatusCode::BAD_GATEWAY
            }
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidOperation => "invalid_operation",
            Self::InvalidRequest => "invalid_request",
            Self::PayloadTooLarge => "payload_too_large",
            Self::RequestTimeout => "request_timeout",
            Self::UpstreamUnreachable => "upstream_unreachable",
            Self::UpstreamError => "upstream_error",
            Self::UpstreamContractViolation => "upstream_contract_violation",
            Self::Internal => "internal",
        }
    }
}

/// A normalized failure, ready to be rendered.
///
/// `detail` is safe to show to clients. `upstream_status` is kept for logs
/// and is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} ({}): {detail}", .kind.as_str(), .http_status)]
pub struct FailureRecord {
    pub kind: ErrorKind,
    pub http_status: u16,
    pub detail: String,
    pub upstream_status: Option<u16>,
}

impl FailureRecord {
    /// Builds a record whose status follows from `kind`.
    #[must_use]
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            http_status: kind.http_status().as_u16(),
            detail: detail.into(),
            upstream_status: None,
        }
    }

    #[must_use]
    pub fn with_upstream_status(mut self, status: Option<u16>) -> Self {
        self.upstream_status = status;
        self
    }

    #[must_use]
    pub fn invalid_operation(identifier: &str) -> Self {
        Self::new(
            ErrorKind::InvalidOperation,
            format!("Unknown transliteration type: {identifier}"),
        )
    }

    #[must_use]
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRequest, reason)
    }

    #[must_use]
    pub fn payload_too_large() -> Self {
        Self::new(ErrorKind::PayloadTooLarge, "Request body too large")
    }

    #[must_use]
    pub fn request_timeout() -> Self {
        Self::new(ErrorKind::RequestTimeout, "Request timed out")
    }

    #[must_use]
    pub fn internal() -> Self {
        Self::new(ErrorKind::Internal, "Internal Server Error")
    }
}

impl IntoResponse for FailureRecord {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            Json(ErrorBody {
                detail: self.detail,
            }),
        )
            .into_response()
    }
}
