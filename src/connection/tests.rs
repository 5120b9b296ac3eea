//! Integration tests for the connection layer
//!
//! These tests drive the receive path through in-memory sources and the send path over
//! loopback UDP.

use super::*;
use crate::codec::FnChecksum;
use crate::payloads::{Electrical, identifiers};
use crate::providers::MemorySource;
use std::net::Ipv4Addr;
use std::time::Duration;
use tracing::info;

fn loopback_config(remote: SocketAddr) -> LinkConfig {
    LinkConfig::loopback(remote)
}

async fn ground_peer() -> (UdpSocket, SocketAddr) {
    let peer = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let addr = peer.local_addr().unwrap();
    (peer, addr)
}

fn wire(frame: &SatelliteFrame) -> Vec<u8> {
    codec::encode(frame).to_vec()
}

async fn wait_until<F>(mut condition: F)
where
    F: FnMut() -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition should hold within timeout");
}

#[tokio::test]
async fn read_fails_loudly_on_an_empty_queue() {
    let connection = Connection::new(LinkConfig::default()).unwrap();
    assert!(!connection.is_bound());
    assert!(!connection.is_read_ready());
    assert!(matches!(connection.read(), Err(LinkError::QueueEmpty)));
}

#[tokio::test]
async fn attached_source_feeds_the_queue_in_order() {
    let _ = tracing_subscriber::fmt::try_init();

    let connection = Connection::new(LinkConfig::default()).unwrap();
    let electrical = Electrical { lightsensor_on: true, battery_voltage: 7.4, ..Default::default() };
    let unknown = SatelliteFrame::new(Topic(4242), vec![1, 2, 3]).unwrap();

    connection
        .attach(MemorySource::replay(vec![
            wire(&electrical.to_frame()),
            wire(&unknown),
            vec![0u8; 100],
            wire(&SatelliteFrame::new(Topic::LIGHT, vec![9, 0]).unwrap()),
        ]))
        .await;

    wait_until(|| connection.pending() == 2).await;
    assert!(connection.is_read_ready());

    let first = connection.read().unwrap();
    assert_eq!(Electrical::from_frame(&first), Some(electrical));
    let second = connection.read_received().unwrap();
    assert_eq!(second.frame.topic, Topic::LIGHT);
    assert!(second.peer.is_none());

    let metrics = connection.metrics();
    info!(?metrics, "After replay");
    assert_eq!(metrics.datagrams_total, 4);
    assert_eq!(metrics.dropped_topic_filtered, 1);
    assert_eq!(metrics.dropped_too_short, 1);
    assert!(connection.last_received().is_some());
}

#[tokio::test]
async fn subscribe_admits_new_topics() {
    let config = LinkConfig::default().with_topics([Topic::COUNTER]);
    let connection = Connection::new(config).unwrap();
    assert!(!connection.is_subscribed(Topic::MISSION));
    assert!(connection.subscribe(Topic::MISSION));
    assert!(!connection.subscribe(Topic::MISSION));
    assert_eq!(connection.topics(), vec![Topic::COUNTER, Topic::MISSION]);

    let (injector, source) = MemorySource::channel(8);
    connection.attach(source).await;
    injector.inject(wire(&SatelliteFrame::new(Topic::MISSION, vec![0u8; 9]).unwrap())).await;

    let frame = tokio::time::timeout(Duration::from_secs(2), connection.recv()).await.unwrap();
    assert_eq!(frame.topic, Topic::MISSION);
}

#[tokio::test]
async fn native_frames_stream_preserves_order() {
    let connection = Connection::new(LinkConfig::default()).unwrap();
    let datagrams: Vec<Vec<u8>> = (0u8..5)
        .map(|n| wire(&SatelliteFrame::new(Topic::COUNTER, vec![n, 0, 0, 0]).unwrap()))
        .collect();
    connection.attach(MemorySource::replay(datagrams)).await;

    let counters: Vec<u8> = tokio::time::timeout(
        Duration::from_secs(2),
        connection.frames(UpdateRate::Native).take(5).map(|r| r.frame.user_data()[0]).collect(),
    )
    .await
    .unwrap();
    assert_eq!(counters, vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn throttled_stream_delivers_latest() {
    let _ = tracing_subscriber::fmt::try_init();

    let connection = Connection::new(LinkConfig::default()).unwrap();
    let (injector, source) = MemorySource::channel(64);
    connection.attach(source).await;

    for n in 0u8..20 {
        injector.inject(wire(&SatelliteFrame::new(Topic::COUNTER, vec![n, 0, 0, 0]).unwrap())).await;
    }
    wait_until(|| connection.pending() == 20).await;

    let mut stream = connection.frames(UpdateRate::Max(10));
    let latest = tokio::time::timeout(Duration::from_secs(2), stream.next()).await.unwrap();
    assert_eq!(latest.unwrap().frame.user_data()[0], 19);
}

#[tokio::test]
async fn telemetry_stream_decodes_records() {
    let connection = Connection::new(LinkConfig::default()).unwrap();
    let electrical = Electrical { battery_voltage: 7.4, ..Default::default() };
    connection.attach(MemorySource::replay(vec![wire(&electrical.to_frame())])).await;

    let record = tokio::time::timeout(
        Duration::from_secs(2),
        connection.telemetry(UpdateRate::Native).next(),
    )
    .await
    .unwrap();
    assert_eq!(record, Some(Telemetry::Electrical(electrical)));
}

#[tokio::test]
async fn frames_stream_ends_when_connection_drops() {
    let connection = Connection::new(LinkConfig::default()).unwrap();
    let mut frames = connection.frames(UpdateRate::Native);
    drop(connection);

    let next = tokio::time::timeout(Duration::from_secs(2), frames.next()).await.unwrap();
    assert!(next.is_none());
}

#[tokio::test]
async fn send_command_reaches_the_remote() {
    let _ = tracing_subscriber::fmt::try_init();

    let (peer, peer_addr) = ground_peer().await;
    let connection =
        Connection::new(loopback_config(peer_addr).with_sender(7, 1)).unwrap();
    let local = connection.bind().await.unwrap();
    assert!(connection.is_bound());
    assert_eq!(connection.local_addr(), Some(local));

    let mut events = connection.subscribe_events();
    let command = Command::new(2, identifiers::RACKS, 1);
    let written = connection.send_command(Topic::TELECOMMAND, command).await.unwrap();
    assert_eq!(written, crate::types::FRAME_LEN);

    let mut buf = vec![0u8; 2048];
    let (len, from) = tokio::time::timeout(Duration::from_secs(2), peer.recv_from(&mut buf))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(len, crate::types::FRAME_LEN);
    assert_eq!(from.port(), local.port());

    let frame = codec::decode(&buf[..len]).unwrap();
    assert_eq!(frame.topic, Topic::TELECOMMAND);
    assert_eq!(frame.sender_node, 7);
    assert_eq!(frame.sender_thread, 1);
    assert_eq!(Command::from_frame(&frame), Some(command));

    let status = loop {
        if let LinkEvent::Status(line) = events.recv().await.unwrap()
            && line.message.starts_with("Sent command")
        {
            break line;
        }
    };
    assert_eq!(status.message, "Sent command id=2 identifier=3001 value=1");
    assert_eq!(connection.metrics().frames_sent, 1);
}

#[tokio::test]
async fn send_on_unbound_link_is_reported() {
    let connection = Connection::new(LinkConfig::default()).unwrap();
    let result = connection.send_raw(Topic::TELECOMMAND, vec![0u8; 12]).await;
    assert!(matches!(result, Err(LinkError::NotBound)));
    assert_eq!(connection.metrics().send_failures, 1);

    let too_long = connection.send_raw(Topic::TELECOMMAND, vec![0u8; 999]).await;
    assert!(matches!(too_long, Err(LinkError::Frame(_))));
}

#[tokio::test]
async fn outbound_frames_carry_the_installed_checksum() {
    let (peer, peer_addr) = ground_peer().await;
    let sum = |covered: &[u8]| covered.iter().fold(0u16, |acc, b| acc.wrapping_add(*b as u16));
    let connection = Connection::new(loopback_config(peer_addr))
        .unwrap()
        .with_checksum(FnChecksum::new(sum));
    connection.bind().await.unwrap();

    connection.send_raw(Topic::TELECOMMAND, vec![1, 2, 3]).await.unwrap();

    let mut buf = vec![0u8; 2048];
    let len = tokio::time::timeout(Duration::from_secs(2), peer.recv(&mut buf))
        .await
        .unwrap()
        .unwrap();
    let policy = FnChecksum::new(sum);
    assert!(codec::verify_checksum(&buf[..len], &policy));
}

#[tokio::test]
async fn bind_twice_rebinds_the_same_port() {
    let _ = tracing_subscriber::fmt::try_init();

    // Reserve a free port, then release it for the connection
    let probe = std::net::UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let port = probe.local_addr().unwrap().port();
    drop(probe);

    let (peer, peer_addr) = ground_peer().await;
    let config = loopback_config(peer_addr)
        .with_local_addr(SocketAddr::from((Ipv4Addr::LOCALHOST, port)));
    let connection = Connection::new(config).unwrap();

    let first = connection.bind().await.unwrap();
    let second = connection.bind().await.unwrap();
    assert_eq!(first, second);
    assert!(connection.is_receiving());

    // The rebound socket still receives
    let frame = SatelliteFrame::new(Topic::LIGHT, vec![5, 0]).unwrap();
    peer.send_to(&wire(&frame), second).await.unwrap();
    let received =
        tokio::time::timeout(Duration::from_secs(2), connection.recv_received()).await.unwrap();
    assert_eq!(received.frame, frame);
    assert_eq!(received.peer, Some(peer_addr));

    connection.unbind().await;
    assert!(!connection.is_bound());
    assert!(!connection.is_receiving());
}

#[tokio::test]
async fn link_monitor_reports_online_then_lost() {
    let connection = Connection::new(LinkConfig::default()).unwrap();
    let mut events = connection.subscribe_events();
    let (injector, source) = MemorySource::channel(4);
    connection.attach(source).await;
    let monitor = connection.spawn_link_monitor(Duration::from_millis(100));

    injector.inject(wire(&SatelliteFrame::new(Topic::LIGHT, vec![1, 0]).unwrap())).await;

    let mut statuses = Vec::new();
    tokio::time::timeout(Duration::from_secs(2), async {
        while statuses.len() < 2 {
            if let Ok(LinkEvent::Status(line)) = events.recv().await
                && line.message.starts_with("Telemetry")
            {
                statuses.push(line.message);
            }
        }
    })
    .await
    .expect("online and lost transitions");
    assert_eq!(statuses, vec!["Telemetry online.", "Telemetry lost."]);

    drop(connection);
    tokio::time::timeout(Duration::from_secs(2), monitor).await.unwrap().unwrap();
}
