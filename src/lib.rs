//! LogView client - async client layer for a server-management dashboard.
//!
//! This crate is the client side of the LogView service: it lists managed
//! servers, asks the service to tail remote log files, executes remote
//! commands, and receives pushed log content over a persistent WebSocket.
//!
//! # Architecture
//!
//! Three components, composed linearly:
//!
//! - **Transport client** ([`api`]): request/response calls to the
//!   management API (`/servers`, `/log/start`, `/log/stop`, `/command`).
//! - **Push channel** ([`push`]): one persistent WebSocket at `/ws` with an
//!   indefinite fixed-delay reconnect loop and a per-type listener registry.
//! - **State store** ([`store`]): single owner of client-visible state,
//!   mutated only through defined actions and mutations, observable through
//!   snapshots and change notifications.
//!
//! The store depends on the transport client; the push channel is wired to
//! the store by the composing application.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use logview_client::{
//!     ApiClient, ClientConfig, ManagementApi, PushChannel, PushEvent, Result, Store,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ClientConfig::from_env()?;
//!
//!     let api = Arc::new(ApiClient::new(&config)?);
//!     let store = Arc::new(Store::new(api as Arc<dyn ManagementApi>));
//!     let channel = PushChannel::new(&config);
//!
//!     // Wire pushed log content into the store.
//!     let sink = Arc::clone(&store);
//!     channel.add_listener(logview_client::LOG_EVENT, move |event| {
//!         if let PushEvent::Log {
//!             server,
//!             file,
//!             content,
//!             ..
//!         } = event
//!         {
//!             sink.append_log_content(server, file, content);
//!         }
//!     });
//!     channel.open();
//!
//!     store.fetch_servers().await;
//!     store.start_log("web-1", "app", 100).await?;
//!     let output = store.execute_command("web-1", "uptime").await?;
//!     println!("{output}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Transport client for the management API |
//! | [`config`] | Base URL, push URL derivation, timing knobs |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`push`] | Push channel: connection, reconnect loop, listeners |
//! | [`store`] | State store: actions, mutations, snapshots |

// ============================================================================
// Modules
// ============================================================================

/// Transport client for the management API.
///
/// Use [`ApiClient`] in production; the [`ManagementApi`] trait is the seam
/// for fakes in tests.
pub mod api;

/// Client configuration.
///
/// Use [`ClientConfig::from_env()`] or [`ClientConfig::new()`].
pub mod config;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Push channel for server-initiated messages.
pub mod push;

/// State store: single owner of client-visible state.
pub mod store;

// ============================================================================
// Re-exports
// ============================================================================

// Transport types
pub use api::{ApiClient, DEFAULT_TAIL_LINES, ManagementApi, ServerDescriptor};

// Configuration
pub use config::ClientConfig;

// Error types
pub use error::{Error, Result};

// Push channel types
pub use push::{ChannelStatus, LOG_EVENT, ListenerId, PushChannel, PushEvent};

// Store types
pub use store::{CommandRecord, DashboardState, HISTORY_LIMIT, StateChange, Store};
