//! Push channel: server-initiated messages over a persistent connection.
//!
//! The management service pushes log content (and, in the future, other
//! message types) over a single WebSocket at `/ws`. This module owns the
//! connection, its indefinite fixed-delay reconnect loop, and the listener
//! registry that fans decoded messages out by type.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `channel` | Connection lifecycle, reconnect loop, listener registry |
//! | `message` | Typed decoding of inbound frames |

// ============================================================================
// Submodules
// ============================================================================

/// Connection lifecycle and listener registry.
pub mod channel;

/// Inbound message decoding.
pub mod message;

// ============================================================================
// Re-exports
// ============================================================================

pub use channel::{ChannelStatus, ListenerCallback, ListenerId, PushChannel};
pub use message::{LOG_EVENT, PushEvent};
