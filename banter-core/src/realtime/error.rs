//! Realtime Error Types
//!
//! Unified error type for the realtime connection layer.

use thiserror::Error;

use super::frame::CloseCode;

/// Errors produced by the realtime connection layer.
#[derive(Error, Debug)]
pub enum RealtimeError {
    /// Failed to open the transport socket.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connect attempt did not reach open within the configured window.
    #[error("connect timed out after {0} ms")]
    ConnectTimeout(u64),

    /// Operation requires an open connection.
    #[error("not connected")]
    NotConnected,

    /// The connection was closed by the peer.
    #[error("connection closed (code {0})")]
    ConnectionClosed(CloseCode),

    /// Send failed at the socket level.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed at the socket level.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// The credential provider could not supply a usable token.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Conversation target is empty or malformed.
    #[error("invalid conversation target: {0}")]
    InvalidTarget(String),

    /// Automatic reconnection gave up after the configured attempt budget.
    #[error("max reconnection attempts exceeded")]
    MaxRetriesExceeded,
}

/// Result alias for realtime operations.
pub type RealtimeResult<T> = Result<T, RealtimeError>;
