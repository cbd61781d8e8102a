//! Client configuration.

use std::time::Duration;

use crate::error::Error;

/// Environment variable holding the API base URL.
pub const ENV_BASE_URL: &str = "PIKA_BASE_URL";
/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "PIKA_API_KEY";
/// Environment variable overriding the request timeout, in seconds.
pub const ENV_TIMEOUT_SECS: &str = "PIKA_TIMEOUT_SECS";
/// Environment variable overriding the upload timeout, in seconds.
pub const ENV_UPLOAD_TIMEOUT_SECS: &str = "PIKA_UPLOAD_TIMEOUT_SECS";

/// Default timeout for API calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default timeout for the raw byte PUT to a presigned URL.
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for connecting to the MiniApp API.
#[derive(Clone)]
pub struct ClientConfig {
    /// API base URL. Falls back to `PIKA_BASE_URL` when unset.
    pub base_url: Option<String>,
    /// MiniApp API key (starts with `ma_`).
    pub api_key: String,
    /// Timeout for API calls.
    pub timeout: Duration,
    /// Timeout for uploads to presigned storage URLs.
    pub upload_timeout: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("upload_timeout", &self.upload_timeout)
            .finish()
    }
}

impl ClientConfig {
    /// Create a configuration with the given API key and default timeouts.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: None,
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Reads:
    /// - `PIKA_BASE_URL` (optional here, required when the client is built)
    /// - `PIKA_API_KEY` (defaults to empty)
    /// - `PIKA_TIMEOUT_SECS` (optional, default 30)
    /// - `PIKA_UPLOAD_TIMEOUT_SECS` (optional, default 60)
    pub fn from_env() -> Self {
        let base_url = std::env::var(ENV_BASE_URL).ok().filter(|s| !s.is_empty());
        let api_key = std::env::var(ENV_API_KEY).unwrap_or_default();
        let timeout = secs_from_env(ENV_TIMEOUT_SECS).unwrap_or(DEFAULT_TIMEOUT);
        let upload_timeout =
            secs_from_env(ENV_UPLOAD_TIMEOUT_SECS).unwrap_or(DEFAULT_UPLOAD_TIMEOUT);

        Self {
            base_url,
            api_key,
            timeout,
            upload_timeout,
        }
    }

    /// Override the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the upload timeout.
    #[must_use]
    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }

    /// Resolve the base URL: explicit value first, then `PIKA_BASE_URL`.
    ///
    /// The result has any trailing `/` removed.
    pub fn resolve_base_url(&self) -> Result<String, Error> {
        let env = std::env::var(ENV_BASE_URL).ok();
        resolve_base_url(self.base_url.as_deref(), env.as_deref())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn secs_from_env(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
}

pub(crate) fn resolve_base_url(
    explicit: Option<&str>,
    env: Option<&str>,
) -> Result<String, Error> {
    explicit
        .filter(|s| !s.is_empty())
        .or(env.filter(|s| !s.is_empty()))
        .map(|url| url.trim_end_matches('/').to_owned())
        .ok_or_else(|| {
            Error::Configuration(format!(
                "No base URL configured. Either pass base_url to the client \
                 or set the {ENV_BASE_URL} environment variable."
            ))
        })
}
