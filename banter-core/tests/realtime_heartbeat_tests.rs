//! Tests for realtime heartbeat behavior
//!
//! Ping emission, pong replies, staleness detection and timer teardown,
//! observed through the manager with a mock transport.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use banter_core::realtime::*;

fn test_config() -> RealtimeConfig {
    RealtimeConfig {
        endpoint_base: "wss://chat.example.com".into(),
        ..Default::default()
    }
}

fn connected_client() -> (RealtimeClient<MockTransport>, Instant) {
    let start = Instant::now();
    let mut client = RealtimeClient::new(
        MockTransport::new(),
        test_config(),
        Box::new(StaticToken::new("tok-1")),
    );
    client
        .connect("conv-42", ConversationKind::Direct)
        .unwrap();
    (client, start)
}

fn ping_count(client: &RealtimeClient<MockTransport>) -> usize {
    client
        .transport()
        .sent_frames()
        .iter()
        .filter(|f| matches!(f, OutboundFrame::Ping { .. }))
        .count()
}

#[test]
fn test_ping_sent_every_interval() {
    let (mut client, start) = connected_client();

    client.tick(start + Duration::from_secs(29));
    assert_eq!(ping_count(&client), 0);

    client.tick(start + Duration::from_secs(31));
    assert_eq!(ping_count(&client), 1);

    client.tick(start + Duration::from_secs(32));
    assert_eq!(ping_count(&client), 1);

    client.tick(start + Duration::from_secs(62));
    assert_eq!(ping_count(&client), 2);
}

#[test]
fn test_received_ping_answered_with_pong_same_tick() {
    let (mut client, start) = connected_client();

    client
        .transport_mut()
        .queue_receive(r#"{"type":"heartbeat","event":"ping","timestamp":"2026-08-28T10:00:00Z"}"#);
    client.tick(start + Duration::from_millis(10));

    let pongs = client
        .transport()
        .sent_frames()
        .iter()
        .filter(|f| matches!(f, OutboundFrame::Pong { .. }))
        .count();
    assert_eq!(pongs, 1);
}

#[test]
fn test_received_pong_is_consumed_silently() {
    let (mut client, start) = connected_client();
    let count = Arc::new(AtomicUsize::new(0));
    let count_clone = Arc::clone(&count);
    client.subscribe(move |_| {
        count_clone.fetch_add(1, Ordering::SeqCst);
    });

    client
        .transport_mut()
        .queue_receive(r#"{"type":"heartbeat","event":"pong"}"#);
    client.tick(start + Duration::from_millis(10));

    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(client.transport().sent_frames().is_empty());
}

#[test]
fn test_staleness_forces_exactly_one_reconnect() {
    let (mut client, start) = connected_client();

    // Three silent check windows in a row
    client.tick(start + Duration::from_secs(37));
    client.tick(start + Duration::from_secs(74));
    assert!(client.is_open());

    client.tick(start + Duration::from_secs(111));
    assert_eq!(client.state(), &ConnectionState::Reconnecting { attempt: 1 });
    assert_eq!(client.transport().state(), SocketState::Disconnected);

    // No duplicate trigger while the reconnect is in flight
    client.tick(start + Duration::from_secs(111) + Duration::from_millis(500));
    assert_eq!(client.state(), &ConnectionState::Reconnecting { attempt: 1 });

    // Scheduled retry brings the channel back
    client.tick(start + Duration::from_secs(113));
    assert!(client.is_open());
    assert_eq!(client.transport().connect_count(), 2);
}

#[test]
fn test_heartbeat_receipt_prevents_staleness() {
    let (mut client, start) = connected_client();

    for round in 1..6 {
        let t = start + Duration::from_secs(34 * round);
        client
            .transport_mut()
            .queue_receive(r#"{"type":"heartbeat","event":"pong"}"#);
        client.tick(t);
        assert!(client.is_open(), "round {} should stay open", round);
    }

    assert_eq!(client.transport().connect_count(), 1);
}

#[test]
fn test_forced_disconnect_cancels_both_timers() {
    let (mut client, start) = connected_client();
    client.disconnect(true).unwrap();
    client.transport_mut().clear_sent();

    // Long after the send and check intervals, nothing fires
    client.tick(start + Duration::from_secs(40));
    client.tick(start + Duration::from_secs(80));
    client.tick(start + Duration::from_secs(160));

    assert!(client.transport().sent_frames().is_empty());
    assert_eq!(client.state(), &ConnectionState::Idle);
    assert_eq!(client.transport().connect_count(), 1);
}

#[test]
fn test_no_pings_while_reconnecting() {
    let (mut client, start) = connected_client();
    client.transport_mut().queue_close(CloseCode::Abnormal);
    client
        .transport_mut()
        .fail_next_connect(RealtimeError::ConnectionFailed("down".into()));

    let t0 = start + Duration::from_secs(1);
    client.tick(t0);
    client.tick(t0 + Duration::from_secs(1)); // failed retry
    client.transport_mut().clear_sent();

    // Heartbeat send interval passes while the channel is down
    client.tick(t0 + Duration::from_secs(40));
    assert_eq!(ping_count(&client), 0);
}

#[test]
fn test_monitor_restarts_after_recovery() {
    let (mut client, start) = connected_client();

    // Go stale, recover via the scheduled reconnect
    client.tick(start + Duration::from_secs(37));
    client.tick(start + Duration::from_secs(74));
    client.tick(start + Duration::from_secs(111));
    let recovered_at = start + Duration::from_secs(113);
    client.tick(recovered_at);
    assert!(client.is_open());
    client.transport_mut().clear_sent();

    // The fresh session pings on its own schedule
    client.tick(recovered_at + Duration::from_secs(31));
    assert_eq!(ping_count(&client), 1);
}
