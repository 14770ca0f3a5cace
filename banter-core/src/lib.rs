// SPDX-FileCopyrightText: 2026 Banter Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Banter Core Library
//!
//! Real-time messaging client core. This crate holds the connection
//! management layer shared by the mobile shells: one persistent channel
//! per chat surface, heartbeat-based liveness detection, bounded
//! reconnection and typed frame dispatch. UI and credential storage live
//! in the platform layers.

pub mod realtime;

pub use realtime::{
    ChatMessage, CloseCode, ConnectionState, Conversation, ConversationKind, DisconnectCause,
    FrameCategory, HeartbeatConfig, HeartbeatEvent, InboundFrame, MockTransport, OutboundFrame,
    PresenceStatus, ReactionAction, RealtimeClient, RealtimeConfig, RealtimeError, RealtimeResult,
    ReconnectConfig, SocketState, StaticToken, SubscriptionId, TokenProvider, Transport,
    TransportConfig,
};

#[cfg(any(feature = "network-native-tls", feature = "network-rustls"))]
pub use realtime::WebSocketTransport;
