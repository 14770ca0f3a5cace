// SPDX-FileCopyrightText: 2026 Banter Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Frame Dispatcher
//!
//! Parses raw inbound text into typed frames and fans them out to
//! registered subscribers. Subscriptions are handle-based: registration
//! returns a monotonically increasing id, unregistration is O(1) and a
//! second unsubscribe with the same id is a safe no-op. Subscribers are
//! invoked in registration order; a panicking subscriber is isolated and
//! does not stop delivery to the rest.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use super::frame::InboundFrame;
use super::manager::ConnectionState;

/// Opaque subscription handle.
pub type SubscriptionId = u64;

type FrameCallback = Box<dyn FnMut(&InboundFrame) + Send>;
type StateCallback = Box<dyn FnMut(&ConnectionState) + Send>;

/// Subscriber registry for inbound frames and connection-state changes.
pub struct Dispatcher {
    frame_subs: BTreeMap<SubscriptionId, FrameCallback>,
    state_subs: BTreeMap<SubscriptionId, StateCallback>,
    next_id: SubscriptionId,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Dispatcher {
            frame_subs: BTreeMap::new(),
            state_subs: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Parses one raw frame. Malformed input and unrecognized frame types
    /// are logged and dropped, never surfaced as errors.
    pub fn parse(raw: &str) -> Option<InboundFrame> {
        match serde_json::from_str::<InboundFrame>(raw) {
            Ok(InboundFrame::Unknown) => {
                tracing::debug!(raw, "dropping frame with unrecognized type");
                None
            }
            Ok(frame) => Some(frame),
            Err(error) => {
                tracing::warn!(%error, "dropping malformed inbound frame");
                None
            }
        }
    }

    /// Registers a frame subscriber and returns its handle.
    pub fn subscribe_frames(&mut self, callback: FrameCallback) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.frame_subs.insert(id, callback);
        id
    }

    /// Removes a frame subscriber. Returns false if already removed.
    pub fn unsubscribe_frames(&mut self, id: SubscriptionId) -> bool {
        self.frame_subs.remove(&id).is_some()
    }

    /// Registers a connection-state subscriber and returns its handle.
    pub fn subscribe_state(&mut self, callback: StateCallback) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.state_subs.insert(id, callback);
        id
    }

    /// Removes a state subscriber. Returns false if already removed.
    pub fn unsubscribe_state(&mut self, id: SubscriptionId) -> bool {
        self.state_subs.remove(&id).is_some()
    }

    pub fn frame_subscriber_count(&self) -> usize {
        self.frame_subs.len()
    }

    pub fn state_subscriber_count(&self) -> usize {
        self.state_subs.len()
    }

    /// Delivers a frame to every frame subscriber in registration order.
    pub fn dispatch_frame(&mut self, frame: &InboundFrame) {
        for (id, callback) in self.frame_subs.iter_mut() {
            let outcome = catch_unwind(AssertUnwindSafe(|| callback(frame)));
            if outcome.is_err() {
                tracing::warn!(subscription = *id, "frame subscriber panicked");
            }
        }
    }

    /// Delivers a state change to every state subscriber in registration order.
    pub fn dispatch_state(&mut self, state: &ConnectionState) {
        for (id, callback) in self.state_subs.iter_mut() {
            let outcome = catch_unwind(AssertUnwindSafe(|| callback(state)));
            if outcome.is_err() {
                tracing::warn!(subscription = *id, "state subscriber panicked");
            }
        }
    }
}
