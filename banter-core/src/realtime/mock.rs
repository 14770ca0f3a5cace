// SPDX-FileCopyrightText: 2026 Banter Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mock Transport
//!
//! In-memory transport for tests. Records every sent frame, replays
//! scripted inbound frames and close events, and lets tests inject
//! connect failures to exercise the reconnect path.

use std::collections::VecDeque;

use super::error::RealtimeError;
use super::frame::{CloseCode, OutboundFrame};
use super::transport::{SocketState, Transport, TransportConfig, TransportResult};

/// Scripted inbound event.
#[derive(Debug)]
enum InboundEvent {
    Frame(String),
    Closed(CloseCode),
    Error(RealtimeError),
}

/// Mock transport for testing connection management logic.
#[derive(Debug)]
pub struct MockTransport {
    state: SocketState,
    sent: Vec<OutboundFrame>,
    inbound: VecDeque<InboundEvent>,
    connect_failures: VecDeque<RealtimeError>,
    connect_count: usize,
    connect_attempts: usize,
    last_config: Option<TransportConfig>,
    last_close_code: Option<CloseCode>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        MockTransport {
            state: SocketState::Disconnected,
            sent: Vec::new(),
            inbound: VecDeque::new(),
            connect_failures: VecDeque::new(),
            connect_count: 0,
            connect_attempts: 0,
            last_config: None,
            last_close_code: None,
        }
    }

    /// Queues a raw inbound frame for the next `receive` calls.
    pub fn queue_receive(&mut self, raw: impl Into<String>) {
        self.inbound.push_back(InboundEvent::Frame(raw.into()));
    }

    /// Queues a peer-initiated close with the given code.
    pub fn queue_close(&mut self, code: CloseCode) {
        self.inbound.push_back(InboundEvent::Closed(code));
    }

    /// Queues a receive-side error.
    pub fn queue_receive_error(&mut self, error: RealtimeError) {
        self.inbound.push_back(InboundEvent::Error(error));
    }

    /// Makes the next `connect` call fail with `error`. Queue several to
    /// script consecutive failures.
    pub fn fail_next_connect(&mut self, error: RealtimeError) {
        self.connect_failures.push_back(error);
    }

    /// Returns every frame sent since the last `clear_sent`.
    pub fn sent_frames(&self) -> &[OutboundFrame] {
        &self.sent
    }

    pub fn clear_sent(&mut self) {
        self.sent.clear();
    }

    /// Number of successful connect calls, i.e. distinct socket instances.
    pub fn connect_count(&self) -> usize {
        self.connect_count
    }

    /// Number of connect calls made, successful or not.
    pub fn connect_attempts(&self) -> usize {
        self.connect_attempts
    }

    /// Config of the most recent connect attempt.
    pub fn last_config(&self) -> Option<&TransportConfig> {
        self.last_config.as_ref()
    }

    /// Close code of the most recent local `close` call.
    pub fn last_close_code(&self) -> Option<CloseCode> {
        self.last_close_code
    }

    /// Forces the socket state, bypassing the normal lifecycle.
    pub fn set_state(&mut self, state: SocketState) {
        self.state = state;
    }
}

impl Transport for MockTransport {
    fn connect(&mut self, config: &TransportConfig) -> TransportResult<()> {
        self.connect_attempts += 1;
        self.last_config = Some(config.clone());
        if let Some(error) = self.connect_failures.pop_front() {
            self.state = SocketState::Disconnected;
            return Err(error);
        }
        self.state = SocketState::Connected;
        self.connect_count += 1;
        Ok(())
    }

    fn close(&mut self, code: CloseCode) -> TransportResult<()> {
        self.state = SocketState::Disconnected;
        self.last_close_code = Some(code);
        Ok(())
    }

    fn state(&self) -> SocketState {
        self.state
    }

    fn send(&mut self, frame: &OutboundFrame) -> TransportResult<()> {
        if self.state != SocketState::Connected {
            return Err(RealtimeError::NotConnected);
        }
        self.sent.push(frame.clone());
        Ok(())
    }

    fn receive(&mut self) -> TransportResult<Option<String>> {
        if self.state != SocketState::Connected {
            return Err(RealtimeError::NotConnected);
        }
        match self.inbound.pop_front() {
            Some(InboundEvent::Frame(raw)) => Ok(Some(raw)),
            Some(InboundEvent::Closed(code)) => {
                self.state = SocketState::Disconnected;
                Err(RealtimeError::ConnectionClosed(code))
            }
            Some(InboundEvent::Error(error)) => Err(error),
            None => Ok(None),
        }
    }

    fn has_pending(&self) -> bool {
        !self.inbound.is_empty()
    }
}
