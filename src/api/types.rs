//! Wire payload types for the management API.
//!
//! Request bodies use the service's `camelCase` key spelling. The server
//! descriptor is deliberately opaque: this layer stores whatever the service
//! returns and leaves interpretation to the UI.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// ServerDescriptor
// ============================================================================

/// One managed server as returned by `GET /servers`.
///
/// The shape is owned by the service and not interpreted here beyond a
/// best-effort [`name`](Self::name) accessor. The full collection is
/// replaced wholesale on each successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerDescriptor(pub Value);

impl ServerDescriptor {
    /// Returns the server name when the descriptor carries one.
    ///
    /// Tolerates both `name` and `Name` key spellings.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0
            .get("name")
            .or_else(|| self.0.get("Name"))
            .and_then(Value::as_str)
    }
}

// ============================================================================
// Request Payloads
// ============================================================================

/// Body of `POST /log/start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartLogRequest {
    /// Target server name.
    pub server_name: String,

    /// Alias of the log file on that server.
    pub file_alias: String,

    /// Number of trailing lines to start from.
    pub lines: u32,
}

/// Body of `POST /log/stop`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopLogRequest {
    /// Target server name.
    pub server_name: String,

    /// Alias of the log file on that server.
    pub file_alias: String,
}

/// Body of `POST /command`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    /// Target server name.
    pub server_name: String,

    /// Command line to execute.
    pub command: String,
}

// ============================================================================
// Response Payloads
// ============================================================================

/// Body of the `POST /command` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandResponse {
    /// Captured stdout of the command.
    pub output: String,
}

// ============================================================================
// Tests
// ============================================================================
