//! Push channel connection and reconnect loop.
//!
//! [`PushChannel`] maintains at most one live WebSocket connection to the
//! management service and dispatches decoded [`PushEvent`]s to registered
//! listeners. The channel is an owned value with an explicit lifecycle:
//! the composing application calls [`PushChannel::open`] once and injects
//! clones wherever events are consumed.
//!
//! # Connection Lifecycle
//!
//! 1. `open` - spawn the background task (no-op while one is alive)
//! 2. task connects to the configured `ws(s)://.../ws` URL
//! 3. inbound frames decode and fan out to listeners of their type
//! 4. on any close or error the task waits the fixed reconnect delay and
//!    connects again, indefinitely
//! 5. `close` - stop the task and drop the connection
//!
//! Malformed frames are logged and dropped; only transport-level close and
//! error events reach the reconnect path.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures_util::StreamExt;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, trace, warn};
use url::Url;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::push::message::PushEvent;

// ============================================================================
// Types
// ============================================================================

/// The connected WebSocket stream type.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Listener callback invoked synchronously for each matching event.
pub type ListenerCallback = Arc<dyn Fn(&PushEvent) + Send + Sync>;

/// Registry of listeners keyed by message type.
type ListenerMap = FxHashMap<String, Vec<(ListenerId, ListenerCallback)>>;

// ============================================================================
// ListenerId
// ============================================================================

/// Unregister handle returned by [`PushChannel::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    /// Generates a fresh listener ID.
    #[inline]
    #[must_use]
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// ============================================================================
// ChannelStatus
// ============================================================================

/// Connection state of the push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatus {
    /// No live connection and no connect attempt in flight.
    Disconnected,
    /// A connect attempt is in flight.
    Connecting,
    /// One live connection exists.
    Connected,
}

// ============================================================================
// PushChannel
// ============================================================================

/// Reconnecting client for the service's push channel.
///
/// Cheap to clone; all clones share the same connection, listener registry
/// and lifecycle.
#[derive(Clone)]
pub struct PushChannel {
    inner: Arc<ChannelInner>,
}

struct ChannelInner {
    /// WebSocket URL derived from the API base.
    ws_url: Url,

    /// Fixed delay between connection loss and the next attempt.
    reconnect_delay: Duration,

    /// Listener registry shared with the background task.
    listeners: Mutex<ListenerMap>,

    /// Current connection state.
    status: Mutex<ChannelStatus>,

    /// Shutdown signal for the background task, present while it is alive.
    shutdown: Mutex<Option<watch::Sender<bool>>>,
}

// ============================================================================
// Constructors
// ============================================================================

impl PushChannel {
    /// Creates a channel from the client configuration.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self::from_url(config.ws_url().clone(), config.reconnect_delay)
    }

    /// Creates a channel for an explicit WebSocket URL.
    #[must_use]
    pub fn from_url(ws_url: Url, reconnect_delay: Duration) -> Self {
        Self {
            inner: Arc::new(ChannelInner {
                ws_url,
                reconnect_delay,
                listeners: Mutex::new(ListenerMap::default()),
                status: Mutex::new(ChannelStatus::Disconnected),
                shutdown: Mutex::new(None),
            }),
        }
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

impl PushChannel {
    /// Opens the channel.
    ///
    /// Spawns the background connect loop. No-op while a previous `open` is
    /// still alive, whether connected or mid-reconnect.
    pub fn open(&self) {
        let mut slot = self.inner.shutdown.lock();

        if let Some(tx) = slot.as_ref()
            && !tx.is_closed()
        {
            debug!("push channel already open");
            return;
        }

        let (tx, rx) = watch::channel(false);
        *slot = Some(tx);

        // The task holds a weak reference so dropping every channel handle
        // also tears the loop down.
        let inner = Arc::downgrade(&self.inner);
        tokio::spawn(run_loop(inner, rx));
    }

    /// Closes the channel and stops reconnecting.
    pub fn close(&self) {
        let tx = self.inner.shutdown.lock().take();
        if let Some(tx) = tx {
            let _ = tx.send(true);
        }
    }

    /// Returns the current connection state.
    #[inline]
    #[must_use]
    pub fn status(&self) -> ChannelStatus {
        *self.inner.status.lock()
    }

    /// Returns `true` if one live connection exists.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.status() == ChannelStatus::Connected
    }
}

// ============================================================================
// Listener Registry
// ============================================================================

impl PushChannel {
    /// Registers a callback for every event whose type equals `kind`.
    ///
    /// Returns an ID to pass to [`Self::remove_listener`]. Callbacks for the
    /// same type run in unspecified order.
    pub fn add_listener<F>(&self, kind: impl Into<String>, callback: F) -> ListenerId
    where
        F: Fn(&PushEvent) + Send + Sync + 'static,
    {
        let id = ListenerId::generate();
        self.inner
            .listeners
            .lock()
            .entry(kind.into())
            .or_default()
            .push((id, Arc::new(callback)));
        id
    }

    /// Removes a previously registered callback.
    ///
    /// Idempotent: removing an absent listener is a no-op.
    pub fn remove_listener(&self, kind: &str, id: ListenerId) {
        let mut listeners = self.inner.listeners.lock();
        if let Some(entries) = listeners.get_mut(kind) {
            entries.retain(|(entry_id, _)| *entry_id != id);
        }
    }
}

// ============================================================================
// ChannelInner
// ============================================================================

impl ChannelInner {
    fn set_status(&self, status: ChannelStatus) {
        *self.status.lock() = status;
    }

    /// Invokes every listener registered for the event's type.
    ///
    /// Callbacks are cloned out of the registry first so a callback may
    /// register or remove listeners without deadlocking.
    fn dispatch(&self, event: &PushEvent) {
        let callbacks: Vec<ListenerCallback> = {
            let listeners = self.listeners.lock();
            match listeners.get(event.kind()) {
                Some(entries) => entries.iter().map(|(_, cb)| Arc::clone(cb)).collect(),
                None => {
                    trace!(kind = event.kind(), "push event without listeners");
                    return;
                }
            }
        };

        for callback in callbacks {
            callback(event);
        }
    }
}

// ============================================================================
// Connect Loop
// ============================================================================

/// Background task: connect, read frames, reconnect after the fixed delay.
async fn run_loop(inner: Weak<ChannelInner>, mut shutdown: watch::Receiver<bool>) {
    loop {
        let Some(strong) = inner.upgrade() else { break };
        let ws_url = strong.ws_url.clone();
        let delay = strong.reconnect_delay;
        strong.set_status(ChannelStatus::Connecting);
        drop(strong);

        let connected = tokio::select! {
            result = connect_async(ws_url.as_str()) => result,
            _ = shutdown.changed() => break,
        };

        match connected {
            Ok((stream, _)) => {
                info!(url = %ws_url, "push channel connected");
                let Some(strong) = inner.upgrade() else { break };
                strong.set_status(ChannelStatus::Connected);
                drop(strong);

                let stopped = read_frames(&inner, stream, &mut shutdown).await;

                if let Some(strong) = inner.upgrade() {
                    strong.set_status(ChannelStatus::Disconnected);
                }
                if stopped {
                    break;
                }
                warn!(url = %ws_url, "push channel disconnected");
            }

            Err(e) => {
                let Some(strong) = inner.upgrade() else { break };
                strong.set_status(ChannelStatus::Disconnected);
                drop(strong);
                warn!(url = %ws_url, error = %e, "push channel connect failed");
            }
        }

        // One reconnect attempt per fully closed connection. Fixed delay,
        // no backoff growth, no retry cap.
        tokio::select! {
            () = sleep(delay) => {}
            _ = shutdown.changed() => break,
        }
    }

    if let Some(strong) = inner.upgrade() {
        strong.set_status(ChannelStatus::Disconnected);
    }
    debug!("push channel task terminated");
}

/// Reads frames until the connection ends or shutdown is requested.
///
/// Returns `true` when shutdown was requested.
async fn read_frames(
    inner: &Weak<ChannelInner>,
    mut stream: WsStream,
    shutdown: &mut watch::Receiver<bool>,
) -> bool {
    loop {
        tokio::select! {
            message = stream.next() => match message {
                Some(Ok(Message::Text(text))) => handle_frame(inner, &text),

                Some(Ok(Message::Close(_))) => {
                    debug!("push channel closed by remote");
                    return false;
                }

                Some(Err(e)) => {
                    error!(error = %e, "push channel read error");
                    return false;
                }

                None => {
                    debug!("push channel stream ended");
                    return false;
                }

                // Ignore Binary, Ping, Pong
                Some(Ok(_)) => {}
            },

            _ = shutdown.changed() => {
                let _ = stream.close(None).await;
                return true;
            }
        }
    }
}

/// Decodes one text frame and fans it out to listeners.
///
/// Decode failures are logged and dropped; they never reach the reconnect
/// path.
fn handle_frame(inner: &Weak<ChannelInner>, text: &str) {
    let Some(strong) = inner.upgrade() else { return };

    match PushEvent::decode(text) {
        Ok(event) => strong.dispatch(&event),
        Err(e) => warn!(error = %e, "dropping malformed push frame"),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use futures_util::SinkExt;
    use tokio::net::TcpListener;
    use tokio::time::timeout;
    use tokio_tungstenite::accept_async;
    use tracing_subscriber::EnvFilter;

    const TEST_DELAY: Duration = Duration::from_millis(50);

    /// Enables `RUST_LOG`-controlled tracing output for the async tests.
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn test_channel(url: &str) -> PushChannel {
        PushChannel::from_url(Url::parse(url).expect("url"), TEST_DELAY)
    }

    async fn bind_server() -> (TcpListener, PushChannel) {
        init_tracing();
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let channel = test_channel(&format!("ws://127.0.0.1:{port}/ws"));
        (listener, channel)
    }

    async fn accept_ws(listener: &TcpListener) -> WebSocketStream<TcpStream> {
        let (stream, _) = timeout(Duration::from_secs(2), listener.accept())
            .await
            .expect("accept timed out")
            .expect("accept");
        accept_async(stream).await.expect("handshake")
    }

    async fn wait_for(mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached within deadline");
    }

    #[test]
    fn test_dispatch_routes_by_type() {
        let channel = test_channel("ws://127.0.0.1:1/ws");
        let log_hits = Arc::new(AtomicUsize::new(0));
        let other_hits = Arc::new(AtomicUsize::new(0));

        let hits = Arc::clone(&log_hits);
        channel.add_listener("log", move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
        });
        let hits = Arc::clone(&other_hits);
        channel.add_listener("serverStatus", move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
        });

        let event = PushEvent::Log {
            server: "web-1".into(),
            file: "app".into(),
            content: "x".into(),
            timestamp: None,
        };
        channel.inner.dispatch(&event);
        channel.inner.dispatch(&event);

        assert_eq!(log_hits.load(Ordering::SeqCst), 2);
        assert_eq!(other_hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_removed_listener_stops_receiving() {
        let channel = test_channel("ws://127.0.0.1:1/ws");
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        let id = channel.add_listener("log", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let event = PushEvent::Log {
            server: "s".into(),
            file: "f".into(),
            content: "c".into(),
            timestamp: None,
        };
        channel.inner.dispatch(&event);

        channel.remove_listener("log", id);
        channel.inner.dispatch(&event);

        // Removing again is a no-op.
        channel.remove_listener("log", id);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_event_without_listeners_is_dropped() {
        let channel = test_channel("ws://127.0.0.1:1/ws");
        let event = PushEvent::Unknown {
            kind: "serverStatus".into(),
            payload: serde_json::json!({"type": "serverStatus"}),
        };
        channel.inner.dispatch(&event);
    }

    #[tokio::test]
    async fn test_malformed_frame_does_not_break_connection() {
        let (listener, channel) = bind_server().await;

        let received = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        channel.add_listener("log", move |event| {
            sink.lock().push(event.clone());
        });

        channel.open();
        let mut server = accept_ws(&listener).await;

        server
            .send(Message::text("definitely not json"))
            .await
            .expect("send");
        server
            .send(Message::text(
                r#"{"type": "log", "server": "web-1", "file": "app", "content": "line\n"}"#,
            ))
            .await
            .expect("send");

        let sink = Arc::clone(&received);
        wait_for(move || !sink.lock().is_empty()).await;

        let events = received.lock().clone();
        assert_eq!(events.len(), 1, "malformed frame must not reach listeners");
        assert!(channel.is_connected(), "malformed frame must not disconnect");

        channel.close();
    }

    #[tokio::test]
    async fn test_open_is_idempotent() {
        let (listener, channel) = bind_server().await;

        channel.open();
        channel.open();
        channel.open();

        let _server = accept_ws(&listener).await;
        {
            let channel = channel.clone();
            wait_for(move || channel.is_connected()).await;
        }

        // A second connection attempt would show up here.
        let extra = timeout(Duration::from_millis(300), listener.accept()).await;
        assert!(extra.is_err(), "repeated open must not add connections");

        channel.close();
    }

    #[tokio::test]
    async fn test_reconnects_after_disconnect() {
        let (listener, channel) = bind_server().await;

        channel.open();
        let server = accept_ws(&listener).await;
        {
            let channel = channel.clone();
            wait_for(move || channel.is_connected()).await;
        }

        // Kill the connection; the channel should come back on its own.
        drop(server);
        {
            let channel = channel.clone();
            wait_for(move || !channel.is_connected()).await;
        }

        let _second = accept_ws(&listener).await;
        {
            let channel = channel.clone();
            wait_for(move || channel.is_connected()).await;
        }

        // And again, one attempt per disconnect.
        drop(_second);
        let _third = accept_ws(&listener).await;

        channel.close();
    }

    #[tokio::test]
    async fn test_close_stops_reconnecting() {
        let (listener, channel) = bind_server().await;

        channel.open();
        let server = accept_ws(&listener).await;
        {
            let channel = channel.clone();
            wait_for(move || channel.is_connected()).await;
        }

        channel.close();
        drop(server);
        {
            let channel = channel.clone();
            wait_for(move || !channel.is_connected()).await;
        }

        let extra = timeout(Duration::from_millis(300), listener.accept()).await;
        assert!(extra.is_err(), "closed channel must not reconnect");
    }

    #[tokio::test]
    async fn test_reopen_after_close() {
        let (listener, channel) = bind_server().await;

        channel.open();
        let _server = accept_ws(&listener).await;
        channel.close();
        {
            let channel = channel.clone();
            wait_for(move || !channel.is_connected()).await;
        }

        channel.open();
        let _second = accept_ws(&listener).await;
        {
            let channel = channel.clone();
            wait_for(move || channel.is_connected()).await;
        }

        channel.close();
    }
}
