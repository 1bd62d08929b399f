//! Command-line and environment configuration for the gateway binary.

use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::network::NetworkConfig;
use crate::service::{UpstreamConfig, DEFAULT_UPSTREAM_URL};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable, colored when attached to a terminal.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// HTTP gateway to the Sangam script-transliteration engine.
#[derive(Debug, Parser)]
#[command(name = "transliterate-server", version, about)]
pub struct Cli {
    /// Address to bind
    #[arg(long, env = "TRANSLIT_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on (0 picks a free port)
    #[arg(long, env = "TRANSLIT_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Base address of the transliteration engine
    #[arg(long, env = "TRANSLIT_UPSTREAM_URL", default_value = DEFAULT_UPSTREAM_URL)]
    pub upstream_url: String,

    /// Timeout for one upstream call, in milliseconds
    #[arg(long, env = "TRANSLIT_UPSTREAM_TIMEOUT_MS", default_value_t = 30_000)]
    pub upstream_timeout_ms: u64,

    /// Retries after a transport failure (connect error or timeout)
    #[arg(long, env = "TRANSLIT_UPSTREAM_MAX_RETRIES", default_value_t = 0)]
    pub upstream_max_retries: u8,

    /// Idle upstream connections kept in the pool
    #[arg(long, env = "TRANSLIT_UPSTREAM_POOL_SIZE", default_value_t = 32)]
    pub upstream_pool_size: usize,

    /// Overall limit for one inbound request, in milliseconds
    #[arg(long, env = "TRANSLIT_REQUEST_TIMEOUT_MS", default_value_t = 60_000)]
    pub request_timeout_ms: u64,

    /// Allowed CORS origin; repeat the flag or pass a comma list. `*` allows any
    #[arg(
        long = "cors-origin",
        env = "TRANSLIT_CORS_ORIGINS",
        value_delimiter = ',',
        default_value = "*"
    )]
    pub cors_origins: Vec<String>,

    /// Largest accepted request body, in bytes
    #[arg(long, env = "TRANSLIT_MAX_BODY_BYTES", default_value_t = 1_048_576)]
    pub max_body_bytes: usize,

    /// Log output format
    #[arg(long, env = "TRANSLIT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl Cli {
    #[must_use]
    pub fn network_config(&self) -> NetworkConfig {
        NetworkConfig {
            host: self.host.clone(),
            port: self.port,
            cors_origins: self.cors_origins.clone(),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            max_body_bytes: self.max_body_bytes,
            ..NetworkConfig::default()
        }
    }

    #[must_use]
    pub fn upstream_config(&self) -> UpstreamConfig {
        UpstreamConfig {
            base_url: self.upstream_url.clone(),
            timeout: Duration::from_millis(self.upstream_timeout_ms),
            max_retries: self.upstream_max_retries,
            pool_max_idle_per_host: self.upstream_pool_size,
            ..UpstreamConfig::default()
        }
    }
}
