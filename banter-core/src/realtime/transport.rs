//! Transport Trait
//!
//! Platform-agnostic abstraction over the duplex, message-framed socket.
//! One transport carries one conversation's channel at a time.

use super::error::RealtimeError;
use super::frame::{CloseCode, OutboundFrame};

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, RealtimeError>;

/// Socket-level connection state.
///
/// This is the raw socket view; the manager layers its own lifecycle
/// (reconnecting, terminal failure) on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketState {
    /// Not connected to any endpoint.
    Disconnected,
    /// Connection in progress.
    Connecting,
    /// Connected and ready.
    Connected,
}

/// Configuration for a single transport connection.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Full connection URI, including the bearer token query parameter.
    pub endpoint_url: String,
    /// Connect timeout in milliseconds. A connect that has not reached
    /// open within this window fails and releases the half-open socket.
    pub connect_timeout_ms: u64,
    /// Receive poll window in milliseconds. `receive` returns `Ok(None)`
    /// after this long with no inbound data, so the event loop keeps
    /// turning.
    pub receive_poll_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            endpoint_url: String::new(),
            connect_timeout_ms: 10_000,
            receive_poll_ms: 250,
        }
    }
}

/// Transport trait for the realtime channel.
///
/// Abstracts the underlying socket (WebSocket in production, mock in
/// tests). The interface is synchronous and driven from one logical event
/// loop; implementations must not block longer than the configured poll
/// window in `receive`.
pub trait Transport: Send {
    /// Opens the connection described by `config`.
    fn connect(&mut self, config: &TransportConfig) -> TransportResult<()>;

    /// Closes the connection with the given close code.
    ///
    /// Safe to call when not connected.
    fn close(&mut self, code: CloseCode) -> TransportResult<()>;

    /// Returns the current socket state.
    fn state(&self) -> SocketState;

    /// Transmits a frame. Fails immediately if the socket is not open;
    /// nothing is queued.
    fn send(&mut self, frame: &OutboundFrame) -> TransportResult<()>;

    /// Returns the next raw inbound frame, `Ok(None)` if nothing arrived
    /// within the poll window, or `Err(RealtimeError::ConnectionClosed)`
    /// when the peer closed the connection.
    fn receive(&mut self) -> TransportResult<Option<String>>;

    /// Returns true if inbound data is already buffered (non-blocking).
    fn has_pending(&self) -> bool;
}
