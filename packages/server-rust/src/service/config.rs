use std::time::Duration;

/// Base address of the public Sangam transliteration engine.
pub const DEFAULT_UPSTREAM_URL: &str = "https://sangam.learnpunjabi.org/SindhiTransliteration.asmx";

/// Configuration for calls to the upstream transliteration engine.
///
/// Set once at startup; the adapter never mutates it.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base address; the operation's path segment is appended to it.
    pub base_url: String,
    /// Hard limit for one upstream call, connect included.
    pub timeout: Duration,
    /// Extra attempts after a transport failure. 0 disables retrying.
    pub max_retries: u8,
    /// Delay before the first retry; doubles on each further attempt.
    pub retry_base_delay: Duration,
    /// Idle connections kept per upstream host.
    pub pool_max_idle_per_host: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPSTREAM_URL.to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 0,
            retry_base_delay: Duration::from_millis(250),
            pool_max_idle_per_host: 32,
        }
    }
}

impl UpstreamConfig {
    /// Target address for one operation: `<base>/<segment>`.
    #[must_use]
    pub fn endpoint(&self, path_segment: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path_segment.trim_start_matches('/')
        )
    }

    /// Delay to wait before retry number `attempt` (1-based).
    #[must_use]
    pub fn retry_delay(&self, attempt: u8) -> Duration {
        let exponent = u32::from(attempt.saturating_sub(1));
        self.retry_base_delay
            .saturating_mul(2u32.saturating_pow(exponent))
    }

    /// Checks that `base_url` is an absolute http(s) address and the
    /// timeout is non-zero.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
        }
        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(ConfigError::NoHost(self.base_url.clone()));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

/// Why an [`UpstreamConfig`] cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid upstream url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("unsupported upstream url scheme: {0}")]
    UnsupportedScheme(String),
    #[error("upstream url has no host: {0}")]
    NoHost(String),
    #[error("upstream timeout must be greater than zero")]
    ZeroTimeout,
}
