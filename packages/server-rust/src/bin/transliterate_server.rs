//! `transliterate-server` binary.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use transliterate_core::OperationRegistry;
use transliterate_server::cli::{Cli, LogFormat};
use transliterate_server::{HttpUpstream, NetworkModule, RequestDispatcher};

/// Log level comes from `RUST_LOG` (default: info).
fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let upstream_config = cli.upstream_config();
    upstream_config
        .validate()
        .context("invalid upstream configuration")?;
    info!(
        upstream = %upstream_config.base_url,
        timeout_ms = u64::try_from(upstream_config.timeout.as_millis()).unwrap_or(u64::MAX),
        max_retries = upstream_config.max_retries,
        "upstream configured"
    );

    let upstream = HttpUpstream::new(upstream_config).context("failed to build HTTP client")?;
    let dispatcher = RequestDispatcher::new(OperationRegistry::builtin(), Arc::new(upstream));

    let mut network = NetworkModule::new(cli.network_config(), Arc::new(dispatcher));
    network.start().await?;
    network.serve(shutdown_signal()).await?;

    info!("transliteration gateway stopped");
    Ok(())
}

/// Resolves on Ctrl-C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
