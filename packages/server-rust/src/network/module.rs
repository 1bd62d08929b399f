//! Gateway server lifecycle: bind, serve, drain.

use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::config::NetworkConfig;
use super::handlers::{
    discovery_handler, health_handler, liveness_handler, openapi_handler, readiness_handler,
    transliteration_routes, AppState,
};
use super::middleware::apply_http_layers;
use super::shutdown::ShutdownController;
use crate::service::RequestDispatcher;

/// Owns the HTTP server lifecycle.
///
/// 1. `new()` -- allocates the shutdown controller
/// 2. `start()` -- binds the listener
/// 3. `serve()` -- serves until shutdown, then drains in-flight requests
pub struct NetworkModule {
    config: NetworkConfig,
    listener: Option<TcpListener>,
    dispatcher: Arc<RequestDispatcher>,
    shutdown: Arc<ShutdownController>,
}

impl NetworkModule {
    #[must_use]
    pub fn new(config: NetworkConfig, dispatcher: Arc<RequestDispatcher>) -> Self {
        Self {
            config,
            listener: None,
            dispatcher,
            shutdown: Arc::new(ShutdownController::new()),
        }
    }

    #[must_use]
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.shutdown)
    }

    /// The complete gateway router, middleware applied.
    ///
    /// Routes:
    /// - `GET /` -- discovery
    /// - `POST|GET /transliterate/<RouteName>` -- one pair per operation
    /// - `POST /transliterate[/]?transliteration_type=<id>` -- generic
    /// - `GET /health`, `/health/live`, `/health/ready`
    /// - `GET /openapi.json`
    pub fn build_router(&self) -> Router {
        let state = AppState {
            dispatcher: Arc::clone(&self.dispatcher),
            shutdown: Arc::clone(&self.shutdown),
            start_time: Instant::now(),
        };

        let router = Router::new()
            .route("/", get(discovery_handler))
            .merge(transliteration_routes(self.dispatcher.registry()))
            .route("/health", get(health_handler))
            .route("/health/live", get(liveness_handler))
            .route("/health/ready", get(readiness_handler))
            .route("/openapi.json", get(openapi_handler));

        apply_http_layers(router, &self.config).with_state(state)
    }

    /// Binds the TCP listener and returns the bound port, which differs
    /// from the configured one when port 0 is used.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        let port = listener.local_addr()?.port();

        info!(host = %self.config.host, port, "TCP listener bound");

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves until `shutdown` resolves, then stops accepting connections
    /// and waits at most the configured drain timeout for in-flight
    /// transliterations. Past the deadline `serve` returns even with
    /// connections still open; they end with the runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if `start()` was not called or the server hits a
    /// fatal I/O error.
    pub async fn serve(
        mut self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let listener = self
            .listener
            .take()
            .context("start() must be called before serve()")?;
        let router = self.build_router();
        let controller = Arc::clone(&self.shutdown);

        let mut stop = controller.shutdown_receiver();
        let server = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = stop.wait_for(|stop| *stop).await;
            })
            .into_future();
        tokio::pin!(server);

        controller.set_ready();
        info!(
            operations = self.dispatcher.registry().len(),
            "transliteration gateway ready"
        );

        tokio::select! {
            result = &mut server => {
                controller.set_stopped();
                return result.context("server loop failed");
            }
            () = shutdown => {}
        }

        info!("shutdown signal received, draining");
        controller.trigger_shutdown();

        let drain_timeout = self.config.drain_timeout;
        let drained = tokio::select! {
            result = &mut server => {
                result.context("server loop failed")?;
                true
            }
            drained = controller.wait_for_drain(drain_timeout) => drained,
        };

        if drained {
            info!("all in-flight requests drained");
        } else {
            warn!(
                in_flight = controller.in_flight_count(),
                timeout_ms = u64::try_from(drain_timeout.as_millis()).unwrap_or(u64::MAX),
                "drain timeout expired with requests still in flight"
            );
        }
        controller.set_stopped();
        Ok(())
    }
}
