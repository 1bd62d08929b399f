//! Single entry point for every transliteration request.
//!
//! Resolves the operation, calls the upstream adapter, and is the only
//! place where upstream failures are turned into client-facing failures.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, info_span, warn, Instrument};
use transliterate_core::{OperationDescriptor, OperationRegistry, TransliterationResult};

use super::failure::{ErrorKind, FailureRecord};
use super::upstream::{UpstreamFailure, UpstreamPort};

/// Resolves operations and normalizes upstream failures.
///
/// Holds no per-request state; share it behind an `Arc`.
pub struct RequestDispatcher {
    registry: &'static OperationRegistry,
    upstream: Arc<dyn UpstreamPort>,
}

impl RequestDispatcher {
    #[must_use]
    pub fn new(registry: &'static OperationRegistry, upstream: Arc<dyn UpstreamPort>) -> Self {
        Self { registry, upstream }
    }

    #[must_use]
    pub fn registry(&self) -> &'static OperationRegistry {
        self.registry
    }

    /// Runs `operation` on `text`.
    ///
    /// `operation` is a canonical identifier (`Gurmukhi2Shahmukhi`) or a
    /// public route name (`GurmukhiToShahmukhi`).
    ///
    /// # Errors
    ///
    /// - `InvalidOperation` (400) when the name is unknown
    /// - `UpstreamUnreachable` (502) on connect failures and timeouts
    /// - `UpstreamError` (502) on any non-200 upstream status
    /// - `UpstreamContractViolation` (502) on a 200 without a string `d`
    /// - `Internal` (500) otherwise
    pub async fn dispatch(
        &self,
        operation: &str,
        text: &str,
    ) -> Result<TransliterationResult, FailureRecord> {
        let span = info_span!(
            "dispatch",
            operation = operation,
            text_chars = text.chars().count(),
            duration_ms = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );

        async move {
            let start = Instant::now();
            let result = self.run(operation, text).await;

            let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            let outcome = match &result {
                Ok(_) => "ok",
                Err(failure) => failure.kind.as_str(),
            };
            tracing::Span::current().record("duration_ms", duration_ms);
            tracing::Span::current().record("outcome", outcome);
            info!(operation, duration_ms, outcome, "dispatch complete");

            result
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        operation: &str,
        text: &str,
    ) -> Result<TransliterationResult, FailureRecord> {
        let Some(descriptor) = self.registry.lookup(operation) else {
            warn!(operation, "unknown transliteration type");
            return Err(FailureRecord::invalid_operation(operation));
        };

        self.upstream
            .call(descriptor.upstream_path, text)
            .await
            .map(|result| TransliterationResult { result })
            .map_err(|failure| normalize(descriptor, &failure))
    }
}

/// Maps an adapter failure to what the client is allowed to see, logging the
/// full upstream detail on the way.
fn normalize(descriptor: &OperationDescriptor, failure: &UpstreamFailure) -> FailureRecord {
    let operation = descriptor.identifier();
    match failure {
        UpstreamFailure::Status {
            status,
            body_excerpt,
        } => {
            warn!(operation, upstream_status = status, body = %body_excerpt, "upstream returned an error status");
            FailureRecord::new(
                ErrorKind::UpstreamError,
                "Error with external transliteration service",
            )
            .with_upstream_status(Some(*status))
        }
        UpstreamFailure::Timeout { .. } | UpstreamFailure::Transport { .. } => {
            warn!(operation, error = %failure, "upstream unreachable");
            FailureRecord::new(
                ErrorKind::UpstreamUnreachable,
                "External transliteration service is unreachable",
            )
        }
        UpstreamFailure::MalformedResponse { reason } => {
            warn!(operation, reason = %reason, "upstream response violates the envelope contract");
            FailureRecord::new(
                ErrorKind::UpstreamContractViolation,
                "External transliteration service returned an unexpected response",
            )
        }
        UpstreamFailure::Request { message } => {
            error!(operation, error = %message, "failed to build upstream request");
            FailureRecord::internal()
        }
    }
}
