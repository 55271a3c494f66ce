//! Error types for the LogView client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use logview_client::{Result, Store};
//!
//! async fn example(store: &Store) -> Result<()> {
//!     let output = store.execute_command("web-1", "uptime").await?;
//!     println!("{output}");
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Remote service | [`Error::Status`], [`Error::Transport`] |
//! | Push channel | [`Error::Decode`], [`Error::WebSocket`] |
//! | External | [`Error::Io`], [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when the client configuration is invalid, e.g. an API base
    /// URL that cannot be parsed or turned into a WebSocket URL.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Remote Service Errors
    // ========================================================================
    /// Non-success HTTP status from the management service.
    ///
    /// Returned when a request reaches the service but is rejected.
    #[error("HTTP status {status} for {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Request URL.
        url: String,
    },

    /// HTTP transport failure.
    ///
    /// Returned when a request never completes (DNS, connect, timeout).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    // ========================================================================
    // Push Channel Errors
    // ========================================================================
    /// Inbound push frame could not be decoded.
    ///
    /// The channel logs and drops such frames; they never terminate the
    /// connection.
    #[error("Decode error: {message}")]
    Decode {
        /// Description of the decode failure.
        message: String,
    },

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an HTTP status error.
    #[inline]
    pub fn status(status: u16, url: impl Into<String>) -> Self {
        Self::Status {
            status,
            url: url.into(),
        }
    }

    /// Creates a decode error.
    #[inline]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this error came from the HTTP transport or a
    /// non-success status, i.e. the remote call itself failed.
    #[inline]
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::Transport(_))
    }

    /// Returns `true` if this is a decode error for an inbound push frame.
    #[inline]
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_error_display() {
        let err = Error::status(502, "http://localhost/api/servers");
        assert_eq!(
            err.to_string(),
            "HTTP status 502 for http://localhost/api/servers"
        );
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("invalid API base");
        assert_eq!(err.to_string(), "Configuration error: invalid API base");
    }

    #[test]
    fn test_is_remote() {
        let status_err = Error::status(500, "http://localhost/api/command");
        let config_err = Error::config("test");

        assert!(status_err.is_remote());
        assert!(!config_err.is_remote());
    }

    #[test]
    fn test_is_decode() {
        let decode_err = Error::decode("missing type field");
        let config_err = Error::config("test");

        assert!(decode_err.is_decode());
        assert!(!config_err.is_decode());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
