// SPDX-FileCopyrightText: 2026 Banter Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Wire Frame Types
//!
//! Typed model of everything exchanged over a chat connection. Inbound
//! frames are a tagged union keyed by the server's `type` field; anything
//! the client does not recognize lands in [`InboundFrame::Unknown`] and is
//! dropped at the parse boundary instead of crashing the pipeline.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// WebSocket close codes with defined meaning for the reconnect policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseCode {
    /// Normal closure, client-initiated or clean server shutdown. No reconnect.
    Normal,
    /// Abnormal closure (connection dropped without a close handshake).
    Abnormal,
    /// Server rejected the bearer token. Retrying with the same token is pointless.
    AuthFailure,
    /// The conversation does not exist or the caller may not join it.
    Forbidden,
    /// Any other code; treated like an abnormal closure.
    Other(u16),
}

impl CloseCode {
    pub fn from_u16(code: u16) -> Self {
        match code {
            1000 => CloseCode::Normal,
            1006 => CloseCode::Abnormal,
            4001 => CloseCode::AuthFailure,
            4004 => CloseCode::Forbidden,
            other => CloseCode::Other(other),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CloseCode::Normal => 1000,
            CloseCode::Abnormal => 1006,
            CloseCode::AuthFailure => 4001,
            CloseCode::Forbidden => 4004,
            CloseCode::Other(code) => *code,
        }
    }

    /// Returns true if this closure should not trigger reconnection.
    pub fn is_clean(&self) -> bool {
        matches!(self, CloseCode::Normal)
    }
}

impl fmt::Display for CloseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// Coarse frame category used for routing decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameCategory {
    Message,
    Typing,
    Receipt,
    Reaction,
    Presence,
    Heartbeat,
    Error,
    Unknown,
}

/// Heartbeat sub-kind. Both directions update liveness the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeartbeatEvent {
    Ping,
    Pong,
}

/// Reaction direction for `message.reaction` frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionAction {
    Add,
    Remove,
}

/// Presence values carried by `presence_update` / `user.online` / `user.offline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceStatus {
    Online,
    Offline,
}

/// Body of an inbound `chat.message` frame.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatMessage {
    /// Server-assigned message id, if the server included one.
    pub message_id: Option<String>,
    pub content: String,
    /// Free-form kind tag ("text", "image", ...). Opaque to this layer.
    pub message_type: String,
    pub metadata: Option<serde_json::Value>,
    pub media_id: Option<String>,
    pub user_id: Option<String>,
    pub username: Option<String>,
}

/// A single parsed frame received from the server.
///
/// Tagged by the wire `type` field. Unrecognized tags deserialize into
/// [`InboundFrame::Unknown`] for forward compatibility.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum InboundFrame {
    #[serde(rename = "chat.message")]
    ChatMessage {
        message: ChatMessage,
        timestamp: Option<DateTime<Utc>>,
    },
    #[serde(rename = "typing.indicator")]
    Typing {
        user_id: String,
        username: Option<String>,
        is_typing: bool,
        timestamp: Option<DateTime<Utc>>,
    },
    #[serde(rename = "read.receipt")]
    ReadReceipt {
        message_id: String,
        user_id: String,
        timestamp: Option<DateTime<Utc>>,
    },
    #[serde(rename = "message.reaction")]
    Reaction {
        message_id: String,
        emoji: String,
        action: ReactionAction,
        user_id: String,
        timestamp: Option<DateTime<Utc>>,
    },
    #[serde(rename = "user.online")]
    UserOnline {
        user_id: String,
        username: Option<String>,
        timestamp: Option<DateTime<Utc>>,
    },
    #[serde(rename = "user.offline")]
    UserOffline {
        user_id: String,
        username: Option<String>,
        timestamp: Option<DateTime<Utc>>,
    },
    #[serde(rename = "heartbeat")]
    Heartbeat {
        event: HeartbeatEvent,
        timestamp: Option<DateTime<Utc>>,
    },
    #[serde(rename = "error")]
    Error {
        code: String,
        message: String,
        details: Option<serde_json::Value>,
    },
    /// Unrecognized frame type (forward compatibility).
    #[serde(other)]
    Unknown,
}

impl InboundFrame {
    /// Returns the routing category of this frame.
    pub fn category(&self) -> FrameCategory {
        match self {
            InboundFrame::ChatMessage { .. } => FrameCategory::Message,
            InboundFrame::Typing { .. } => FrameCategory::Typing,
            InboundFrame::ReadReceipt { .. } => FrameCategory::Receipt,
            InboundFrame::Reaction { .. } => FrameCategory::Reaction,
            InboundFrame::UserOnline { .. } | InboundFrame::UserOffline { .. } => {
                FrameCategory::Presence
            }
            InboundFrame::Heartbeat { .. } => FrameCategory::Heartbeat,
            InboundFrame::Error { .. } => FrameCategory::Error,
            InboundFrame::Unknown => FrameCategory::Unknown,
        }
    }
}

/// A single frame to transmit, tagged by the wire `event` field.
///
/// Every outbound frame carries an ISO-8601 timestamp. Construct through
/// the helper functions so the timestamp is stamped at build time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event")]
pub enum OutboundFrame {
    #[serde(rename = "send_message")]
    SendMessage {
        content: String,
        message_type: String,
        metadata: serde_json::Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        media_id: Option<String>,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename = "start_typing")]
    StartTyping {
        is_typing: bool,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename = "stop_typing")]
    StopTyping {
        is_typing: bool,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename = "mark_read")]
    MarkRead {
        message_id: String,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename = "add_reaction")]
    AddReaction {
        message_id: String,
        emoji: String,
        action: ReactionAction,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename = "remove_reaction")]
    RemoveReaction {
        message_id: String,
        emoji: String,
        action: ReactionAction,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename = "presence_update")]
    PresenceUpdate {
        presence_status: PresenceStatus,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename = "ping")]
    Ping { timestamp: DateTime<Utc> },
    #[serde(rename = "pong")]
    Pong { timestamp: DateTime<Utc> },
}

impl OutboundFrame {
    /// Creates a chat message frame.
    pub fn message(
        content: &str,
        message_type: &str,
        metadata: serde_json::Value,
        media_id: Option<String>,
    ) -> Self {
        OutboundFrame::SendMessage {
            content: content.to_string(),
            message_type: message_type.to_string(),
            metadata,
            media_id,
            timestamp: Utc::now(),
        }
    }

    /// Creates a typing indicator frame; the event name encodes the direction.
    pub fn typing(is_typing: bool) -> Self {
        if is_typing {
            OutboundFrame::StartTyping {
                is_typing,
                timestamp: Utc::now(),
            }
        } else {
            OutboundFrame::StopTyping {
                is_typing,
                timestamp: Utc::now(),
            }
        }
    }

    /// Creates a read receipt frame.
    pub fn read_receipt(message_id: &str) -> Self {
        OutboundFrame::MarkRead {
            message_id: message_id.to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a reaction frame; the event name encodes the action.
    pub fn reaction(message_id: &str, emoji: &str, action: ReactionAction) -> Self {
        match action {
            ReactionAction::Add => OutboundFrame::AddReaction {
                message_id: message_id.to_string(),
                emoji: emoji.to_string(),
                action,
                timestamp: Utc::now(),
            },
            ReactionAction::Remove => OutboundFrame::RemoveReaction {
                message_id: message_id.to_string(),
                emoji: emoji.to_string(),
                action,
                timestamp: Utc::now(),
            },
        }
    }

    /// Creates a presence update frame.
    pub fn presence(status: PresenceStatus) -> Self {
        OutboundFrame::PresenceUpdate {
            presence_status: status,
            timestamp: Utc::now(),
        }
    }

    /// Creates a heartbeat ping frame.
    pub fn ping() -> Self {
        OutboundFrame::Ping {
            timestamp: Utc::now(),
        }
    }

    /// Creates a heartbeat pong frame.
    pub fn pong() -> Self {
        OutboundFrame::Pong {
            timestamp: Utc::now(),
        }
    }

    /// Returns true for heartbeat ping/pong frames.
    pub fn is_heartbeat(&self) -> bool {
        matches!(self, OutboundFrame::Ping { .. } | OutboundFrame::Pong { .. })
    }
}
