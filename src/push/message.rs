//! Push message types.
//!
//! Inbound frames on the push channel are JSON objects carrying a `type`
//! field. They decode into the closed [`PushEvent`] union; types this crate
//! does not know become [`PushEvent::Unknown`], and frames that are not
//! valid JSON objects (or that are missing required fields for a known
//! type) are a decode failure the channel logs and drops.
//!
//! # Known Types
//!
//! | `type` | Payload |
//! |--------|---------|
//! | `log` | `{server, file, content, timestamp?}` — tailed log content |

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Type tag of log-content messages.
pub const LOG_EVENT: &str = "log";

// ============================================================================
// PushEvent
// ============================================================================

/// One decoded message from the push channel.
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    /// Tailed log content for one (server, file) pair.
    Log {
        /// Server the content came from.
        server: String,
        /// File alias on that server.
        file: String,
        /// Raw chunk of log text, appended as-is to the client buffer.
        content: String,
        /// Unix timestamp the service attached, when present.
        timestamp: Option<i64>,
    },

    /// A structurally valid message of a type this crate does not know.
    ///
    /// Kept around so listeners registered for future types still fire.
    Unknown {
        /// The message's `type` tag.
        kind: String,
        /// Full message payload.
        payload: Value,
    },
}

/// Payload of a `log` message.
#[derive(Debug, Deserialize)]
struct LogPayload {
    server: String,
    file: String,
    content: String,
    #[serde(default)]
    timestamp: Option<i64>,
}

impl PushEvent {
    /// Decodes one inbound text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] for non-JSON frames, frames without a
    /// string `type` field, and known types with missing required fields.
    pub fn decode(text: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| Error::decode(format!("invalid JSON: {e}")))?;

        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::decode("missing type field"))?
            .to_string();

        match kind.as_str() {
            LOG_EVENT => {
                let payload: LogPayload = serde_json::from_value(value)
                    .map_err(|e| Error::decode(format!("malformed log message: {e}")))?;

                Ok(Self::Log {
                    server: payload.server,
                    file: payload.file,
                    content: payload.content,
                    timestamp: payload.timestamp,
                })
            }

            _ => Ok(Self::Unknown {
                kind,
                payload: value,
            }),
        }
    }

    /// Returns the message's `type` tag, the key listeners register under.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Log { .. } => LOG_EVENT,
            Self::Unknown { kind, .. } => kind,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
