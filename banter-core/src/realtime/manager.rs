// SPDX-FileCopyrightText: 2026 Banter Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Connection Manager
//!
//! Owns the transport socket, heartbeat monitor, reconnection schedule
//! and dispatcher for one active conversation channel. All socket,
//! timer and subscriber work happens on the caller's event loop via
//! [`RealtimeClient::tick`]; there is no internal locking.

use std::time::Instant;

use super::auth::TokenProvider;
use super::dispatch::{Dispatcher, SubscriptionId};
use super::error::{RealtimeError, RealtimeResult};
use super::frame::{
    CloseCode, HeartbeatEvent, InboundFrame, OutboundFrame, PresenceStatus, ReactionAction,
};
use super::heartbeat::{HeartbeatConfig, HeartbeatMonitor, LivenessCheck};
use super::reconnect::{ReconnectConfig, ReconnectSchedule};
use super::transport::{SocketState, Transport, TransportConfig};

/// Routing category of a conversation; selects the endpoint path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationKind {
    /// One-to-one chat.
    Direct,
    /// Group chat.
    Group,
}

/// The conversation a connection targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: String,
    pub kind: ConversationKind,
}

/// Why the manager gave up on a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectCause {
    /// Server rejected the bearer token (close 4001). The caller should
    /// refresh credentials before connecting again.
    AuthRejected,
    /// Conversation missing or not permitted (close 4004).
    TargetForbidden,
    /// Automatic reconnection exhausted its attempt budget.
    RetriesExhausted,
}

/// Manager lifecycle state, as seen by state subscribers.
///
/// `Failed` is terminal until the next explicit `connect`; it is
/// deliberately distinguishable from the `Idle` a user-requested
/// disconnect produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Open,
    Closing,
    Reconnecting { attempt: u32 },
    Failed(DisconnectCause),
}

/// Configuration for the realtime client.
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// Endpoint base, e.g. `wss://chat.example.com`.
    pub endpoint_base: String,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Receive poll window in milliseconds.
    pub receive_poll_ms: u64,
    /// Liveness detection knobs.
    pub heartbeat: HeartbeatConfig,
    /// Backoff knobs.
    pub reconnect: ReconnectConfig,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        RealtimeConfig {
            endpoint_base: String::new(),
            connect_timeout_ms: 10_000,
            receive_poll_ms: 250,
            heartbeat: HeartbeatConfig::default(),
            reconnect: ReconnectConfig::default(),
        }
    }
}

/// Realtime connection manager for one chat surface.
///
/// At most one conversation channel is active per instance; connecting to
/// a different conversation tears the previous channel down first. The
/// owner constructs and drops the client explicitly and drives it by
/// calling [`tick`](Self::tick) from its event loop.
pub struct RealtimeClient<T: Transport> {
    transport: T,
    config: RealtimeConfig,
    tokens: Box<dyn TokenProvider>,
    dispatcher: Dispatcher,
    heartbeat: HeartbeatMonitor,
    reconnect: ReconnectSchedule,
    conversation: Option<Conversation>,
    state: ConnectionState,
    connected_at: Option<Instant>,
    last_send: Option<Instant>,
}

impl<T: Transport> RealtimeClient<T> {
    /// Creates a new client. Nothing connects until `connect` is called.
    pub fn new(transport: T, config: RealtimeConfig, tokens: Box<dyn TokenProvider>) -> Self {
        let heartbeat = HeartbeatMonitor::new(config.heartbeat.clone());
        let reconnect = ReconnectSchedule::new(config.reconnect.clone());
        RealtimeClient {
            transport,
            config,
            tokens,
            dispatcher: Dispatcher::new(),
            heartbeat,
            reconnect,
            conversation: None,
            state: ConnectionState::Idle,
            connected_at: None,
            last_send: None,
        }
    }

    /// Current manager state.
    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Conversation currently targeted, if any.
    pub fn conversation(&self) -> Option<&Conversation> {
        self.conversation.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    /// Instant the current connection reached open, if it is still up.
    pub fn connected_at(&self) -> Option<Instant> {
        self.connected_at
    }

    /// Instant of the most recent successful send on this connection.
    pub fn last_send_at(&self) -> Option<Instant> {
        self.last_send
    }

    /// Returns a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns a mutable reference to the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Connects to a conversation channel.
    ///
    /// Idempotent while the same conversation is open. A different active
    /// conversation is torn down first, including any pending reconnect
    /// scheduled for it. Resolves once the socket is open; the attempt is
    /// bounded by the configured connect timeout.
    pub fn connect(&mut self, conversation_id: &str, kind: ConversationKind) -> RealtimeResult<()> {
        if conversation_id.is_empty() {
            return Err(RealtimeError::InvalidTarget("empty conversation id".into()));
        }

        let target = Conversation {
            id: conversation_id.to_string(),
            kind,
        };

        if self.conversation.as_ref() == Some(&target) && self.state == ConnectionState::Open {
            return Ok(());
        }

        if let Some(current) = self.conversation.take() {
            if current != target {
                tracing::debug!(from = %current.id, to = %target.id, "switching conversation");
                self.teardown_channel();
            }
        }

        // Explicit connect always starts a fresh attempt budget and
        // invalidates any pending scheduled reconnect.
        self.reconnect.reset();
        self.conversation = Some(target);
        self.open_transport(Instant::now())
    }

    /// Disconnects the channel.
    ///
    /// With `force = false` this is a deliberate no-op: the connection is
    /// kept alive across transient screen-navigation events, and only a
    /// forced disconnect actually releases it. With `force = true` the
    /// socket closes with a normal code, both heartbeat timers stop, all
    /// counters reset and the manager returns to `Idle`.
    pub fn disconnect(&mut self, force: bool) -> RealtimeResult<()> {
        if !force {
            tracing::debug!("soft disconnect ignored, connection kept alive");
            return Ok(());
        }

        // From Idle there is no channel to close; skip the Closing
        // transition so subscribers see no phantom lifecycle.
        if self.state != ConnectionState::Idle {
            self.set_state(ConnectionState::Closing);
        }
        self.teardown_channel();
        self.conversation = None;
        self.connected_at = None;
        self.last_send = None;
        self.set_state(ConnectionState::Idle);
        Ok(())
    }

    /// Sends a chat message. Requires an open connection; nothing is queued.
    pub fn send_message(
        &mut self,
        content: &str,
        message_type: &str,
        metadata: serde_json::Value,
        media_id: Option<String>,
    ) -> RealtimeResult<()> {
        self.send_frame(OutboundFrame::message(
            content,
            message_type,
            metadata,
            media_id,
        ))
    }

    /// Sends a typing indicator.
    pub fn send_typing(&mut self, is_typing: bool) -> RealtimeResult<()> {
        self.send_frame(OutboundFrame::typing(is_typing))
    }

    /// Marks a message as read.
    pub fn send_read_receipt(&mut self, message_id: &str) -> RealtimeResult<()> {
        self.send_frame(OutboundFrame::read_receipt(message_id))
    }

    /// Adds or removes a reaction.
    pub fn send_reaction(
        &mut self,
        message_id: &str,
        emoji: &str,
        action: ReactionAction,
    ) -> RealtimeResult<()> {
        self.send_frame(OutboundFrame::reaction(message_id, emoji, action))
    }

    /// Publishes a presence change.
    pub fn send_presence(&mut self, status: PresenceStatus) -> RealtimeResult<()> {
        self.send_frame(OutboundFrame::presence(status))
    }

    /// Registers a frame subscriber; heartbeat frames are never delivered.
    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&InboundFrame) + Send + 'static,
    ) -> SubscriptionId {
        self.dispatcher.subscribe_frames(Box::new(callback))
    }

    /// Removes a frame subscriber. A second call with the same handle is
    /// a no-op.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.dispatcher.unsubscribe_frames(id);
    }

    /// Registers a connection-state subscriber.
    pub fn subscribe_state(
        &mut self,
        callback: impl FnMut(&ConnectionState) + Send + 'static,
    ) -> SubscriptionId {
        self.dispatcher.subscribe_state(Box::new(callback))
    }

    /// Removes a state subscriber. Idempotent like `unsubscribe`.
    pub fn unsubscribe_state(&mut self, id: SubscriptionId) {
        self.dispatcher.unsubscribe_state(id);
    }

    /// Drives the event loop: due reconnects, inbound frames, heartbeats.
    ///
    /// Call regularly (at least a few times per second) with
    /// `Instant::now()`. Frames are dispatched in arrival order.
    pub fn tick(&mut self, now: Instant) {
        self.run_due_reconnect(now);
        self.pump_inbound(now);
        self.service_heartbeat(now);
    }

    fn run_due_reconnect(&mut self, now: Instant) {
        if !self.reconnect.fire_if_due(now) {
            return;
        }
        if self.conversation.is_none() {
            return;
        }
        tracing::debug!(attempt = self.reconnect.attempt(), "reconnect attempt due");
        let _ = self.open_transport(now);
    }

    fn pump_inbound(&mut self, now: Instant) {
        if self.transport.state() != SocketState::Connected {
            return;
        }
        loop {
            match self.transport.receive() {
                Ok(Some(raw)) => self.handle_raw(&raw, now),
                Ok(None) => break,
                Err(RealtimeError::ConnectionClosed(code)) => {
                    self.handle_closed(code, now);
                    break;
                }
                Err(error) => {
                    tracing::warn!(%error, "receive failed, treating as abnormal closure");
                    let _ = self.transport.close(CloseCode::Abnormal);
                    self.handle_closed(CloseCode::Abnormal, now);
                    break;
                }
            }
        }
    }

    fn service_heartbeat(&mut self, now: Instant) {
        if self.state != ConnectionState::Open {
            return;
        }

        if self.heartbeat.poll_send(now) && self.transport.state() == SocketState::Connected {
            if let Err(error) = self.transport.send(&OutboundFrame::ping()) {
                tracing::warn!(%error, "heartbeat ping failed");
            }
        }

        match self.heartbeat.poll_check(now) {
            LivenessCheck::Alive => {}
            LivenessCheck::Missed(count) => {
                tracing::debug!(missed = count, "heartbeat missed");
            }
            LivenessCheck::Stale => {
                tracing::warn!("connection stale, forcing reconnect");
                self.heartbeat.stop();
                let _ = self.transport.close(CloseCode::Abnormal);
                self.schedule_reconnect(now);
            }
        }
    }

    fn handle_raw(&mut self, raw: &str, now: Instant) {
        let Some(frame) = Dispatcher::parse(raw) else {
            return;
        };

        if let InboundFrame::Heartbeat { event, .. } = &frame {
            self.heartbeat.observe_heartbeat(now);
            if *event == HeartbeatEvent::Ping {
                // Reply in the same tick so the peer's own liveness check
                // sees us promptly.
                if let Err(error) = self.transport.send(&OutboundFrame::pong()) {
                    tracing::warn!(%error, "pong reply failed");
                }
            }
            return;
        }

        self.dispatcher.dispatch_frame(&frame);
    }

    fn handle_closed(&mut self, code: CloseCode, now: Instant) {
        self.heartbeat.stop();
        self.connected_at = None;
        match code {
            CloseCode::Normal => {
                tracing::debug!("peer closed cleanly");
                self.reconnect.reset();
                self.set_state(ConnectionState::Idle);
            }
            CloseCode::AuthFailure => {
                tracing::warn!("closed by server: authentication rejected");
                self.reconnect.reset();
                self.set_state(ConnectionState::Failed(DisconnectCause::AuthRejected));
            }
            CloseCode::Forbidden => {
                tracing::warn!("closed by server: conversation forbidden");
                self.reconnect.reset();
                self.set_state(ConnectionState::Failed(DisconnectCause::TargetForbidden));
            }
            other => {
                tracing::debug!(code = other.as_u16(), "abnormal closure");
                self.schedule_reconnect(now);
            }
        }
    }

    /// Opens the transport toward the current conversation and, on
    /// success, arms the heartbeat monitor.
    fn open_transport(&mut self, now: Instant) -> RealtimeResult<()> {
        let conversation = self
            .conversation
            .clone()
            .ok_or(RealtimeError::NotConnected)?;

        self.set_state(ConnectionState::Connecting);

        let endpoint_url = match self.endpoint_for(&conversation) {
            Ok(url) => url,
            Err(error) => {
                self.set_state(ConnectionState::Failed(DisconnectCause::AuthRejected));
                return Err(error);
            }
        };

        let transport_config = TransportConfig {
            endpoint_url,
            connect_timeout_ms: self.config.connect_timeout_ms,
            receive_poll_ms: self.config.receive_poll_ms,
        };

        match self.transport.connect(&transport_config) {
            Ok(()) => {
                self.reconnect.reset();
                self.heartbeat.start(now);
                self.connected_at = Some(now);
                self.set_state(ConnectionState::Open);
                Ok(())
            }
            Err(error) => {
                tracing::debug!(%error, conversation = %conversation.id, "connect failed");
                self.schedule_reconnect(now);
                Err(error)
            }
        }
    }

    fn schedule_reconnect(&mut self, now: Instant) {
        if matches!(self.state, ConnectionState::Failed(_)) {
            return;
        }
        match self.reconnect.schedule(now) {
            Ok(delay) => {
                let attempt = self.reconnect.attempt();
                tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "reconnect scheduled");
                self.set_state(ConnectionState::Reconnecting { attempt });
            }
            Err(RealtimeError::MaxRetriesExceeded) => {
                tracing::warn!("reconnect budget exhausted, giving up");
                self.set_state(ConnectionState::Failed(DisconnectCause::RetriesExhausted));
            }
            Err(_) => unreachable!("schedule only fails with MaxRetriesExceeded"),
        }
    }

    /// Closes the socket and cancels timers and pending reconnects,
    /// leaving subscriber registrations intact.
    fn teardown_channel(&mut self) {
        self.heartbeat.stop();
        self.reconnect.reset();
        if self.transport.state() != SocketState::Disconnected {
            let _ = self.transport.close(CloseCode::Normal);
        }
    }

    fn send_frame(&mut self, frame: OutboundFrame) -> RealtimeResult<()> {
        if self.state != ConnectionState::Open {
            return Err(RealtimeError::NotConnected);
        }
        match self.transport.send(&frame) {
            Ok(()) => {
                self.last_send = Some(Instant::now());
                Ok(())
            }
            Err(RealtimeError::ConnectionClosed(code)) => {
                self.handle_closed(code, Instant::now());
                Err(RealtimeError::ConnectionClosed(code))
            }
            Err(error) => Err(error),
        }
    }

    fn endpoint_for(&self, conversation: &Conversation) -> RealtimeResult<String> {
        let token = self.tokens.bearer_token()?;
        let path = match conversation.kind {
            ConversationKind::Direct => format!("/ws/chat/{}/", conversation.id),
            ConversationKind::Group => format!("/ws/group/{}/", conversation.id),
        };
        Ok(format!(
            "{}{}?token={}",
            self.config.endpoint_base, path, token
        ))
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state == state {
            return;
        }
        self.state = state;
        let snapshot = self.state.clone();
        self.dispatcher.dispatch_state(&snapshot);
    }
}
