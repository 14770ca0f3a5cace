//! Realtime Connection Layer
//!
//! Maintains a persistent duplex connection to the chat backend,
//! multiplexes the chat frame kinds over it, detects silent connection
//! death via heartbeats and recovers with bounded exponential backoff.
//!
//! # Architecture
//!
//! - **Transport trait**: platform-agnostic interface for the socket
//! - **Frame types**: tagged wire model for inbound/outbound frames
//! - **Heartbeat monitor**: ping emission and staleness detection
//! - **Reconnect schedule**: bounded exponential backoff
//! - **Dispatcher**: handle-based fan-out to subscribers
//! - **Realtime client**: connection lifecycle ownership
//!
//! # Example
//!
//! ```ignore
//! use banter_core::realtime::{
//!     ConversationKind, MockTransport, RealtimeClient, RealtimeConfig, StaticToken,
//! };
//!
//! let transport = MockTransport::new();
//! let config = RealtimeConfig::default();
//! let mut client = RealtimeClient::new(transport, config, Box::new(StaticToken::new(token)));
//!
//! let sub = client.subscribe(|frame| println!("{frame:?}"));
//! client.connect("conv-42", ConversationKind::Direct)?;
//! loop {
//!     client.tick(std::time::Instant::now());
//!     // ... run the rest of the UI event loop
//! }
//! ```

#[cfg(feature = "testing")]
pub mod auth;
#[cfg(not(feature = "testing"))]
mod auth;

#[cfg(feature = "testing")]
pub mod dispatch;
#[cfg(not(feature = "testing"))]
mod dispatch;

#[cfg(feature = "testing")]
pub mod error;
#[cfg(not(feature = "testing"))]
mod error;

#[cfg(feature = "testing")]
pub mod frame;
#[cfg(not(feature = "testing"))]
mod frame;

#[cfg(feature = "testing")]
pub mod heartbeat;
#[cfg(not(feature = "testing"))]
mod heartbeat;

#[cfg(feature = "testing")]
pub mod manager;
#[cfg(not(feature = "testing"))]
mod manager;

#[cfg(feature = "testing")]
pub mod mock;
#[cfg(not(feature = "testing"))]
mod mock;

#[cfg(feature = "testing")]
pub mod reconnect;
#[cfg(not(feature = "testing"))]
mod reconnect;

#[cfg(feature = "testing")]
pub mod timer;
#[cfg(not(feature = "testing"))]
mod timer;

#[cfg(feature = "testing")]
pub mod transport;
#[cfg(not(feature = "testing"))]
mod transport;

#[cfg(all(
    any(feature = "network-native-tls", feature = "network-rustls"),
    feature = "testing"
))]
pub mod websocket;
#[cfg(all(
    any(feature = "network-native-tls", feature = "network-rustls"),
    not(feature = "testing")
))]
mod websocket;

// Error types
pub use error::{RealtimeError, RealtimeResult};

// Frame types
pub use frame::{
    ChatMessage, CloseCode, FrameCategory, HeartbeatEvent, InboundFrame, OutboundFrame,
    PresenceStatus, ReactionAction,
};

// Credential boundary
pub use auth::{StaticToken, TokenProvider};

// Transport abstraction
pub use transport::{SocketState, Transport, TransportConfig, TransportResult};

// Mock transport for testing
pub use mock::MockTransport;

// WebSocket transport for production
#[cfg(any(feature = "network-native-tls", feature = "network-rustls"))]
pub use websocket::WebSocketTransport;

// Liveness and backoff configuration
pub use heartbeat::{HeartbeatConfig, HeartbeatMonitor, LivenessCheck};
pub use reconnect::{ReconnectConfig, ReconnectSchedule};

// Subscriptions
pub use dispatch::{Dispatcher, SubscriptionId};

// Connection management
pub use manager::{
    ConnectionState, Conversation, ConversationKind, DisconnectCause, RealtimeClient,
    RealtimeConfig,
};
