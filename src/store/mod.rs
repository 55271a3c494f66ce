//! State store: single owner of client-visible state.
//!
//! [`Store`] holds the server list, the per-(server, file) log buffers and
//! the bounded command history. State changes only through the defined
//! actions and mutations; observers either take immutable snapshots via
//! [`Store::snapshot`] or subscribe to [`StateChange`] notifications.
//!
//! # Error Policy
//!
//! Each action picks one of two policies, depending on whether the caller
//! needs to react:
//!
//! | Action | Policy |
//! |--------|--------|
//! | [`Store::fetch_servers`] | swallow and log |
//! | [`Store::start_log`] | log and propagate |
//! | [`Store::stop_log`] | swallow and log |
//! | [`Store::execute_command`] | log and propagate |

// ============================================================================
// Submodules
// ============================================================================

/// State value and its mutations.
pub mod state;

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, error};

use crate::api::ManagementApi;
use crate::error::Result;

// ============================================================================
// Re-exports
// ============================================================================

pub use state::{CommandRecord, DashboardState, HISTORY_LIMIT};

// ============================================================================
// Constants
// ============================================================================

/// Capacity of the change notification channel.
///
/// Lagging subscribers miss notifications rather than blocking actions.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

// ============================================================================
// StateChange
// ============================================================================

/// Notification emitted after each committed mutation.
///
/// Carries enough to know what changed; subscribers read the new value from
/// a fresh [`Store::snapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    /// The server collection was replaced.
    ServersReplaced,

    /// Log content was appended for one (server, file) pair.
    LogAppended {
        /// Server the content belongs to.
        server: String,
        /// File alias on that server.
        file: String,
    },

    /// A log buffer was reset to empty.
    LogCleared {
        /// Server the buffer belongs to.
        server: String,
        /// File alias on that server.
        file: String,
    },

    /// A command history entry was prepended.
    HistoryPushed,
}

// ============================================================================
// Store
// ============================================================================

/// Single owner of client-visible state.
///
/// Actions compose one [`ManagementApi`] call with zero or more mutations.
/// Mutations run under a short-lived lock on the single state value, never
/// across an await point.
pub struct Store {
    /// Transport client, injected so tests can fake the service.
    api: Arc<dyn ManagementApi>,

    /// The state value. Snapshots clone it; mutations are single-step.
    state: Mutex<DashboardState>,

    /// Change notifications for observers.
    changes: broadcast::Sender<StateChange>,
}

impl Store {
    /// Creates a store over the given transport client.
    #[must_use]
    pub fn new(api: Arc<dyn ManagementApi>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            api,
            state: Mutex::new(DashboardState::default()),
            changes,
        }
    }

    /// Returns an immutable snapshot of the current state.
    #[must_use]
    pub fn snapshot(&self) -> DashboardState {
        self.state.lock().clone()
    }

    /// Subscribes to change notifications.
    ///
    /// Only mutations committed after this call are observed.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.changes.subscribe()
    }

    /// Emits a change notification; absent subscribers are fine.
    fn notify(&self, change: StateChange) {
        let _ = self.changes.send(change);
    }
}

// ============================================================================
// Actions
// ============================================================================

impl Store {
    /// Fetches the server list and replaces the stored collection.
    ///
    /// Failures are logged and swallowed; existing state stays untouched.
    pub async fn fetch_servers(&self) {
        match self.api.list_servers().await {
            Ok(servers) => {
                debug!(count = servers.len(), "fetched servers");
                self.state.lock().set_servers(servers);
                self.notify(StateChange::ServersReplaced);
            }
            Err(e) => {
                error!(error = %e, "failed to fetch servers");
            }
        }
    }

    /// Asks the service to start tailing `file` on `server`.
    ///
    /// Performs no mutation: content arrives later on the push channel and
    /// is committed through [`Store::append_log_content`].
    ///
    /// # Errors
    ///
    /// Propagates the transport error after logging it.
    pub async fn start_log(&self, server: &str, file: &str, lines: u32) -> Result<()> {
        self.api
            .start_log_stream(server, file, lines)
            .await
            .inspect_err(|e| error!(server, file, error = %e, "failed to start log stream"))
    }

    /// Asks the service to stop tailing `file` on `server` and resets the
    /// local buffer on success.
    ///
    /// Failures are logged and swallowed; the buffer stays untouched.
    pub async fn stop_log(&self, server: &str, file: &str) {
        match self.api.stop_log_stream(server, file).await {
            Ok(()) => {
                if self.state.lock().clear_log(server, file) {
                    self.notify(StateChange::LogCleared {
                        server: server.to_string(),
                        file: file.to_string(),
                    });
                }
            }
            Err(e) => {
                error!(server, file, error = %e, "failed to stop log stream");
            }
        }
    }

    /// Executes `command` on `server`, records it in history and returns
    /// the output.
    ///
    /// # Errors
    ///
    /// Propagates the transport error after logging it; history is not
    /// touched on failure.
    pub async fn execute_command(&self, server: &str, command: &str) -> Result<String> {
        match self.api.execute_remote_command(server, command).await {
            Ok(output) => {
                self.state.lock().push_history(CommandRecord {
                    server: server.to_string(),
                    command: command.to_string(),
                    output: output.clone(),
                });
                self.notify(StateChange::HistoryPushed);
                Ok(output)
            }
            Err(e) => {
                error!(server, command, error = %e, "failed to execute command");
                Err(e)
            }
        }
    }
}

// ============================================================================
// Mutations
// ============================================================================

impl Store {
    /// Appends pushed log content to the (server, file) buffer.
    ///
    /// Called by the push-channel wiring when a log message arrives.
    pub fn append_log_content(&self, server: &str, file: &str, content: &str) {
        self.state.lock().append_log_content(server, file, content);
        self.notify(StateChange::LogAppended {
            server: server.to_string(),
            file: file.to_string(),
        });
    }

    /// Resets the (server, file) buffer to empty text.
    ///
    /// No-op when the buffer does not exist.
    pub fn clear_log(&self, server: &str, file: &str) {
        if self.state.lock().clear_log(server, file) {
            self.notify(StateChange::LogCleared {
                server: server.to_string(),
                file: file.to_string(),
            });
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
