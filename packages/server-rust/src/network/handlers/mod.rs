//! HTTP handler definitions for the transliteration gateway.
//!
//! This module defines `AppState` (the shared state carried through axum
//! extractors) and re-exports all handler functions for convenient access
//! when building the router.

pub mod discovery;
pub mod health;
pub mod openapi;
pub mod transliterate;

pub use discovery::discovery_handler;
pub use health::{health_handler, liveness_handler, readiness_handler};
pub use openapi::{openapi_handler, ApiDoc};
pub use transliterate::transliteration_routes;

use std::sync::Arc;
use std::time::Instant;

use super::ShutdownController;
use crate::service::RequestDispatcher;

/// Shared application state passed to all axum handlers via `State` extraction.
///
/// Holds `Arc` references to shared resources so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Resolves operations and calls the engine.
    pub dispatcher: Arc<RequestDispatcher>,
    /// Graceful shutdown controller with health state and in-flight tracking.
    pub shutdown: Arc<ShutdownController>,
    /// Server process start time, used for uptime calculation.
    pub start_time: Instant,
}
