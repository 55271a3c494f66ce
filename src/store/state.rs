//! Client-side state and its mutations.
//!
//! [`DashboardState`] is a plain value. Mutations are synchronous methods
//! with no side effects beyond the described assignment; the [`crate::store`]
//! module serializes access and emits change notifications around them.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::api::ServerDescriptor;

// ============================================================================
// Constants
// ============================================================================

/// Maximum number of retained command history entries.
pub const HISTORY_LIMIT: usize = 50;

// ============================================================================
// CommandRecord
// ============================================================================

/// One executed remote command and its output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRecord {
    /// Server the command ran on.
    pub server: String,

    /// The command line.
    pub command: String,

    /// Captured output.
    pub output: String,
}

// ============================================================================
// DashboardState
// ============================================================================

/// All client-visible state.
///
/// Cloneable so the store can hand out immutable snapshots.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    /// Managed servers, replaced wholesale on each successful fetch.
    servers: Vec<ServerDescriptor>,

    /// Accumulated log text per server, per file alias.
    ///
    /// Buffers are created lazily and only ever reset, never removed.
    active_logs: FxHashMap<String, FxHashMap<String, String>>,

    /// Executed commands, most recent first, capped at [`HISTORY_LIMIT`].
    command_history: VecDeque<CommandRecord>,
}

// ============================================================================
// Accessors
// ============================================================================

impl DashboardState {
    /// Returns the current server collection.
    #[inline]
    #[must_use]
    pub fn servers(&self) -> &[ServerDescriptor] {
        &self.servers
    }

    /// Returns the accumulated log text for one (server, file) pair.
    #[must_use]
    pub fn log_content(&self, server: &str, file: &str) -> Option<&str> {
        self.active_logs
            .get(server)
            .and_then(|files| files.get(file))
            .map(String::as_str)
    }

    /// Returns the command history, most recent first.
    #[inline]
    #[must_use]
    pub fn history(&self) -> &VecDeque<CommandRecord> {
        &self.command_history
    }
}

// ============================================================================
// Mutations
// ============================================================================

impl DashboardState {
    /// Replaces the entire server collection.
    pub fn set_servers(&mut self, servers: Vec<ServerDescriptor>) {
        self.servers = servers;
    }

    /// Appends content to the (server, file) buffer, creating the buffer
    /// lazily on first append.
    pub fn append_log_content(&mut self, server: &str, file: &str, content: &str) {
        self.active_logs
            .entry(server.to_string())
            .or_default()
            .entry(file.to_string())
            .or_default()
            .push_str(content);
    }

    /// Resets an existing (server, file) buffer to empty text.
    ///
    /// No-op when the buffer does not exist; never creates an entry.
    /// Returns `true` when a buffer was cleared.
    pub fn clear_log(&mut self, server: &str, file: &str) -> bool {
        if let Some(buffer) = self
            .active_logs
            .get_mut(server)
            .and_then(|files| files.get_mut(file))
        {
            buffer.clear();
            true
        } else {
            false
        }
    }

    /// Prepends a history entry, evicting the oldest beyond [`HISTORY_LIMIT`].
    pub fn push_history(&mut self, record: CommandRecord) {
        self.command_history.push_front(record);
        while self.command_history.len() > HISTORY_LIMIT {
            self.command_history.pop_back();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
