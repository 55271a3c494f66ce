//! Client configuration.
//!
//! Provides [`ClientConfig`], which owns the management service base URL and
//! the timing knobs shared by the transport client and the push channel.
//!
//! # Example
//!
//! ```
//! use logview_client::ClientConfig;
//!
//! let config = ClientConfig::new("http://dashboard.local:8080/api").unwrap();
//! assert_eq!(config.ws_url().as_str(), "ws://dashboard.local:8080/ws");
//! ```
//!
//! The base URL can also come from the environment via [`ClientConfig::from_env`],
//! which reads [`API_BASE_ENV`] and falls back to [`DEFAULT_API_BASE`].

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Environment variable overriding the API base URL.
pub const API_BASE_ENV: &str = "LOGVIEW_API_URL";

/// Default API base URL when [`API_BASE_ENV`] is unset.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8080/api";

/// Fixed path of the push channel on the service host.
pub const WS_PATH: &str = "/ws";

/// Delay between a connection loss and the next connect attempt (5s per
/// the service contract, no backoff growth).
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

// ============================================================================
// ClientConfig
// ============================================================================

/// Configuration for the LogView client.
///
/// Holds the API base URL (normalized with a trailing slash so endpoint
/// joining keeps the base path), the push-channel URL derived from it, and
/// timing settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the management API, trailing slash guaranteed.
    api_base: Url,

    /// Push channel URL: same host as the API base, scheme upgraded to its
    /// streaming equivalent, fixed [`WS_PATH`] path.
    ws_url: Url,

    /// Delay before each reconnect attempt of the push channel.
    pub reconnect_delay: Duration,

    /// Optional timeout for individual HTTP requests.
    ///
    /// `None` by default: a request waits as long as the transport allows,
    /// matching the service contract (no client-side timeout enforcement).
    pub request_timeout: Option<Duration>,
}

// ============================================================================
// Constructors
// ============================================================================

impl ClientConfig {
    /// Creates a configuration from an API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL cannot be parsed or uses a
    /// scheme without a WebSocket equivalent.
    pub fn new(api_base: impl AsRef<str>) -> Result<Self> {
        let api_base = normalize_base(api_base.as_ref())?;
        let ws_url = derive_ws_url(&api_base)?;

        Ok(Self {
            api_base,
            ws_url,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            request_timeout: None,
        })
    }

    /// Creates a configuration from the environment.
    ///
    /// Reads [`API_BASE_ENV`]; falls back to [`DEFAULT_API_BASE`] when the
    /// variable is unset or empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configured value is not a valid URL.
    pub fn from_env() -> Result<Self> {
        Self::from_env_value(std::env::var(API_BASE_ENV).ok())
    }

    /// Creates a configuration from an optional env-provided value.
    ///
    /// Split out of [`Self::from_env`] so the fallback logic is testable
    /// without touching process environment.
    fn from_env_value(value: Option<String>) -> Result<Self> {
        match value.as_deref() {
            Some(base) if !base.trim().is_empty() => Self::new(base.trim()),
            _ => Self::new(DEFAULT_API_BASE),
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl ClientConfig {
    /// Sets the reconnect delay of the push channel.
    #[inline]
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Enables a timeout on individual HTTP requests.
    #[inline]
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl ClientConfig {
    /// Returns the normalized API base URL.
    #[inline]
    #[must_use]
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Returns the push channel URL.
    #[inline]
    #[must_use]
    pub fn ws_url(&self) -> &Url {
        &self.ws_url
    }

    /// Joins a relative endpoint path onto the API base.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the resulting URL is invalid.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_base
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::config(format!("invalid endpoint {path}: {e}")))
    }
}

// ============================================================================
// URL Derivation
// ============================================================================

/// Parses the base URL and guarantees a trailing slash on its path.
fn normalize_base(base: &str) -> Result<Url> {
    let mut url =
        Url::parse(base).map_err(|e| Error::config(format!("invalid API base {base}: {e}")))?;

    if url.cannot_be_a_base() {
        return Err(Error::config(format!("API base {base} has no host")));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Derives the push channel URL from the API base.
///
/// Keeps the host, swaps the scheme for its streaming equivalent and
/// replaces path and query with the fixed [`WS_PATH`].
fn derive_ws_url(api_base: &Url) -> Result<Url> {
    let scheme = match api_base.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(Error::config(format!(
                "scheme {other} has no WebSocket equivalent"
            )));
        }
    };

    let mut url = api_base.clone();
    url.set_path(WS_PATH);
    url.set_query(None);
    url.set_fragment(None);
    url.set_scheme(scheme)
        .map_err(|()| Error::config(format!("cannot set scheme {scheme}")))?;

    Ok(url)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base() {
        let config = ClientConfig::from_env_value(None).expect("config");
        assert_eq!(config.api_base().as_str(), "http://127.0.0.1:8080/api/");
        assert_eq!(config.ws_url().as_str(), "ws://127.0.0.1:8080/ws");
    }

    #[test]
    fn test_env_value_overrides_default() {
        let config = ClientConfig::from_env_value(Some("https://ops.example.com/api".into()))
            .expect("config");
        assert_eq!(config.api_base().as_str(), "https://ops.example.com/api/");
    }

    #[test]
    fn test_empty_env_value_falls_back() {
        let config = ClientConfig::from_env_value(Some("  ".into())).expect("config");
        assert_eq!(config.api_base().as_str(), "http://127.0.0.1:8080/api/");
    }

    #[test]
    fn test_trailing_slash_preserved() {
        let config = ClientConfig::new("http://localhost:8080/api/").expect("config");
        assert_eq!(config.api_base().as_str(), "http://localhost:8080/api/");
    }

    #[test]
    fn test_ws_url_upgrades_https() {
        let config = ClientConfig::new("https://ops.example.com/api").expect("config");
        assert_eq!(config.ws_url().as_str(), "wss://ops.example.com/ws");
    }

    #[test]
    fn test_ws_url_drops_query() {
        let config = ClientConfig::new("http://localhost:8080/api?token=x").expect("config");
        assert_eq!(config.ws_url().as_str(), "ws://localhost:8080/ws");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let config = ClientConfig::new("http://localhost:8080/api").expect("config");

        let servers = config.endpoint("servers").expect("endpoint");
        assert_eq!(servers.as_str(), "http://localhost:8080/api/servers");

        let start = config.endpoint("/log/start").expect("endpoint");
        assert_eq!(start.as_str(), "http://localhost:8080/api/log/start");
    }

    #[test]
    fn test_invalid_base_rejected() {
        assert!(ClientConfig::new("not a url").is_err());
        assert!(ClientConfig::new("data:text/plain,x").is_err());
    }

    #[test]
    fn test_no_request_timeout_by_default() {
        let config = ClientConfig::new("http://localhost/api").expect("config");
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn test_builder_methods() {
        let config = ClientConfig::new("http://localhost/api")
            .expect("config")
            .with_reconnect_delay(Duration::from_millis(100))
            .with_request_timeout(Duration::from_secs(5));

        assert_eq!(config.reconnect_delay, Duration::from_millis(100));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(5)));
    }
}
