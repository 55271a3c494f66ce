//! Transport client for the management API.
//!
//! This module issues request/response calls against the remote management
//! service: listing servers, starting and stopping log tails, and executing
//! remote commands.
//!
//! # Architecture
//!
//! The [`ManagementApi`] trait is the seam between the [`crate::store`] and
//! the wire. Production code uses [`ApiClient`] (HTTP over reqwest); tests
//! inject fakes.
//!
//! # Endpoints
//!
//! | Operation | Endpoint |
//! |-----------|----------|
//! | [`ManagementApi::list_servers`] | `GET {base}/servers` |
//! | [`ManagementApi::start_log_stream`] | `POST {base}/log/start` |
//! | [`ManagementApi::stop_log_stream`] | `POST {base}/log/stop` |
//! | [`ManagementApi::execute_remote_command`] | `POST {base}/command` |

// ============================================================================
// Submodules
// ============================================================================

/// HTTP implementation of the management API.
pub mod client;

/// Wire payload types.
pub mod types;

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;

use crate::error::Result;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::ApiClient;
pub use types::{CommandRequest, CommandResponse, ServerDescriptor, StartLogRequest, StopLogRequest};

// ============================================================================
// Constants
// ============================================================================

/// Default number of trailing lines requested when a log tail starts.
pub const DEFAULT_TAIL_LINES: u32 = 100;

// ============================================================================
// ManagementApi
// ============================================================================

/// Request/response operations against the management service.
///
/// Every operation is a single exchange: no retry, no local timeout beyond
/// the transport's own, no side effects on client state. Callers decide how
/// to react to failures.
#[async_trait]
pub trait ManagementApi: Send + Sync {
    /// Fetches the current collection of server descriptors.
    async fn list_servers(&self) -> Result<Vec<ServerDescriptor>>;

    /// Asks the service to start tailing `file` on `server`, beginning with
    /// the last `lines` lines. Content arrives later on the push channel.
    async fn start_log_stream(&self, server: &str, file: &str, lines: u32) -> Result<()>;

    /// Asks the service to stop tailing `file` on `server`.
    async fn stop_log_stream(&self, server: &str, file: &str) -> Result<()>;

    /// Executes `command` on `server` and returns its textual output.
    async fn execute_remote_command(&self, server: &str, command: &str) -> Result<String>;
}
