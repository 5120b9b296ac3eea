//! Connection facade for the telemetry link
//!
//! A [`Connection`] owns the UDP socket, the receive task and the inbound queue. The
//! application subscribes to topics, polls or awaits decoded frames, and sends
//! telecommands through it.
//!
//! ```rust,no_run
//! use groundlink::{Command, Connection, LinkConfig, Topic};
//! use groundlink::payloads::identifiers;
//!
//! # async fn run() -> groundlink::Result<()> {
//! let connection = Connection::new(LinkConfig::default())?;
//! connection.bind().await?;
//!
//! let command = Command::new(2, identifiers::RACKS, 1);
//! connection.send_command(Topic::TELECOMMAND, command).await?;
//!
//! let frame = connection.recv().await;
//! println!("{} bytes on {}", frame.user_data_len(), frame.topic);
//! # Ok(())
//! # }
//! ```

pub mod monitor;

#[cfg(test)]
mod tests;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::BroadcastStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::codec::{self, ChecksumPolicy};
use crate::config::LinkConfig;
use crate::driver::{Driver, DriverHandle};
use crate::events::{EVENT_CHANNEL_CAPACITY, LinkEvent};
use crate::filter::TopicFilter;
use crate::ingest::Ingest;
use crate::metrics::{LinkMetrics, MetricsSnapshot};
use crate::payloads::{Command, Telemetry, TopicPayload};
use crate::provider::DatagramSource;
use crate::providers::{UdpSource, bind_socket};
use crate::queue::{FrameQueue, ReceivedFrame};
use crate::stream::ThrottleExt;
use crate::types::{SatelliteFrame, Topic, UpdateRate};
use crate::{LinkError, Result};

pub use monitor::{LINK_LOST_AFTER, LinkMonitor, LinkStatus};

/// Telemetry link to the satellite
///
/// The inbound queue has a single consumer: frames taken by [`read`](Self::read),
/// [`recv`](Self::recv) or a [`frames`](Self::frames) stream are not seen by the others.
pub struct Connection {
    config: LinkConfig,
    ingest: Arc<Ingest>,

    /// Socket used for sending; the receive task holds its own handle
    socket: Mutex<Option<Arc<UdpSocket>>>,

    /// Running receive task
    driver: Mutex<Option<DriverHandle>>,

    /// Serializes bind/attach so a rebind never races another
    rebind: tokio::sync::Mutex<()>,

    /// Cancelled when the connection is dropped; ends streams and monitor tasks
    closed: CancellationToken,
}

impl Connection {
    /// Create an unbound connection subscribed to `config.topics`.
    pub fn new(config: LinkConfig) -> Result<Self> {
        config.validate()?;

        let filter: TopicFilter = config.topics.iter().copied().collect();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let ingest = Ingest::new(
            filter,
            FrameQueue::with_capacity(config.queue_capacity),
            Arc::new(LinkMetrics::new()),
            events,
        );

        debug!(topics = ?config.topics, capacity = config.queue_capacity, "Created connection");

        Ok(Self {
            config,
            ingest: Arc::new(ingest),
            socket: Mutex::new(None),
            driver: Mutex::new(None),
            rebind: tokio::sync::Mutex::new(()),
            closed: CancellationToken::new(),
        })
    }

    /// Install a checksum policy for both directions.
    pub fn with_checksum<P>(self, policy: P) -> Self
    where
        P: ChecksumPolicy + 'static,
    {
        self.set_checksum(Some(Arc::new(policy)));
        self
    }

    /// Replace the checksum policy. `None` accepts every frame and sends zero checksums.
    pub fn set_checksum(&self, policy: Option<Arc<dyn ChecksumPolicy>>) {
        debug!(enabled = policy.is_some(), "Checksum policy changed");
        self.ingest.set_checksum(policy);
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    // ---- binding ----

    /// Bind the telemetry socket and start receiving.
    ///
    /// Calling this again rebinds: the previous receive task is stopped and awaited and the
    /// old socket released before the configured address is bound afresh.
    pub async fn bind(&self) -> Result<SocketAddr> {
        self.bind_to(self.config.local_addr).await
    }

    /// Like [`bind`](Self::bind), on an explicit local address.
    pub async fn bind_to(&self, addr: SocketAddr) -> Result<SocketAddr> {
        let _serial = self.rebind.lock().await;

        let rebinding = self.stop_receiving().await;
        // Release the sending handle too, so the port is free again
        self.socket_slot().take();

        let socket = bind_socket(addr, self.config.broadcast).await?;
        let local = socket.local_addr().map_err(|e| LinkError::bind_failed(addr, e))?;

        let source = UdpSource::new(socket.clone(), self.config.max_datagram_len);
        let driver = Driver::spawn(source, self.ingest.clone());

        *self.socket_slot() = Some(socket);
        *self.driver_slot() = Some(driver);

        if rebinding {
            info!(local_addr = %local, "Rebound telemetry link");
        } else {
            info!(local_addr = %local, remote_addr = %self.config.remote_addr, "Telemetry link up");
        }
        self.emit_status(format!("Listening on {}", local));

        Ok(local)
    }

    /// Feed the receive path from another source (simulator, capture replay).
    ///
    /// Replaces any running receive task. A bound socket stays available for sending.
    pub async fn attach<S>(&self, source: S)
    where
        S: DatagramSource,
    {
        let _serial = self.rebind.lock().await;
        self.stop_receiving().await;

        info!(source = %source.describe(), "Attached datagram source");
        *self.driver_slot() = Some(Driver::spawn(source, self.ingest.clone()));
    }

    /// Stop the receive task and close the socket.
    pub async fn unbind(&self) {
        let _serial = self.rebind.lock().await;
        if self.stop_receiving().await {
            info!("Telemetry link down");
        }
        self.socket_slot().take();
    }

    /// Whether a socket is bound.
    pub fn is_bound(&self) -> bool {
        self.socket_slot().is_some()
    }

    /// Whether a receive task is running.
    pub fn is_receiving(&self) -> bool {
        self.driver_slot().as_ref().is_some_and(|driver| !driver.is_finished())
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket_slot().as_ref().and_then(|socket| socket.local_addr().ok())
    }

    /// Shut down the running receive task, if any. Returns whether one was running.
    async fn stop_receiving(&self) -> bool {
        let previous = self.driver_slot().take();
        match previous {
            Some(driver) => {
                driver.shutdown().await;
                true
            }
            None => false,
        }
    }

    // ---- subscription ----

    /// Retain frames on `topic`. Returns `true` if it was not subscribed before.
    pub fn subscribe(&self, topic: Topic) -> bool {
        let added = self.ingest.subscribe(topic);
        if added {
            debug!(%topic, "Subscribed");
        }
        added
    }

    pub fn subscribe_all<I>(&self, topics: I)
    where
        I: IntoIterator<Item = Topic>,
    {
        self.ingest.subscribe_all(topics);
    }

    pub fn is_subscribed(&self, topic: Topic) -> bool {
        self.ingest.accepts(topic)
    }

    /// Subscribed topics in ascending order.
    pub fn topics(&self) -> Vec<Topic> {
        self.ingest.topics()
    }

    // ---- reading ----

    /// Whether at least one frame is queued.
    pub fn is_read_ready(&self) -> bool {
        !self.ingest.queue().is_empty()
    }

    /// Number of queued frames.
    pub fn pending(&self) -> usize {
        self.ingest.queue().len()
    }

    /// Take the oldest queued frame.
    ///
    /// Fails with [`LinkError::QueueEmpty`] instead of returning stale or default data.
    pub fn read(&self) -> Result<SatelliteFrame> {
        self.read_received().map(|received| received.frame)
    }

    /// Take the oldest queued frame with its arrival metadata.
    pub fn read_received(&self) -> Result<ReceivedFrame> {
        self.ingest.queue().try_pop().ok_or(LinkError::QueueEmpty)
    }

    /// Wait for the next frame.
    pub async fn recv(&self) -> SatelliteFrame {
        self.ingest.queue().pop().await.frame
    }

    /// Wait for the next frame with its arrival metadata.
    pub async fn recv_received(&self) -> ReceivedFrame {
        self.ingest.queue().pop().await
    }

    /// Discard queued frames, returning how many were dropped.
    pub fn clear(&self) -> usize {
        self.ingest.queue().clear()
    }

    /// Stream of received frames.
    ///
    /// [`UpdateRate::Native`] delivers every frame in FIFO order. [`UpdateRate::Max`] is
    /// meant for display consumers: at most one frame per interval, the latest winning.
    /// The stream ends when the connection is dropped.
    pub fn frames(&self, rate: UpdateRate) -> BoxStream<'static, ReceivedFrame> {
        let queue = self.ingest.queue().clone();
        let frames = stream::unfold(queue, |queue| async move {
            let frame = queue.pop().await;
            Some((frame, queue))
        })
        .take_until(self.closed.clone().cancelled_owned());

        match rate.normalize().throttle_interval() {
            None => frames.boxed(),
            Some(interval) => frames.throttle(interval).boxed(),
        }
    }

    /// Stream of decoded telemetry records; frames that are not telemetry are skipped.
    pub fn telemetry(&self, rate: UpdateRate) -> BoxStream<'static, Telemetry> {
        self.frames(rate)
            .filter_map(|received| async move { Telemetry::decode(&received.frame) })
            .boxed()
    }

    /// Instant the most recent frame was queued.
    pub fn last_received(&self) -> Option<Instant> {
        self.ingest.last_received()
    }

    // ---- events ----

    /// Subscribe to link events. Slow subscribers skip missed events.
    pub fn events(&self) -> BoxStream<'static, LinkEvent> {
        BroadcastStream::new(self.ingest.events().subscribe())
            .filter_map(|event| async move { event.ok() })
            .boxed()
    }

    /// Raw broadcast receiver for link events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<LinkEvent> {
        self.ingest.events().subscribe()
    }

    /// Watch the link in the background and emit online/lost status lines.
    ///
    /// The task checks every `threshold / 4` and ends when the connection is dropped.
    pub fn spawn_link_monitor(&self, threshold: Duration) -> JoinHandle<()> {
        let ingest = self.ingest.clone();
        let closed = self.closed.clone();
        let period = (threshold / 4).max(Duration::from_millis(10));

        tokio::spawn(async move {
            let mut monitor = LinkMonitor::with_threshold(threshold);
            let mut ticker = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = closed.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                if let Some(status) = monitor.observe(ingest.last_received(), Instant::now()) {
                    info!(status = ?status, "{}", status.message());
                    let _ = ingest.events().send(LinkEvent::status(status.message()));
                }
            }
        })
    }

    // ---- sending ----

    /// Send `payload` on `topic` as a single frame to the configured remote address.
    ///
    /// Best effort: no retry and no acknowledgement. Failures are logged and counted as
    /// well as returned. Returns the number of bytes written.
    pub async fn send_raw(&self, topic: Topic, payload: impl Into<Bytes>) -> Result<usize> {
        let frame = self.outbound(SatelliteFrame::new(topic, payload)?);
        self.send_frame(&frame).await
    }

    /// Send a telecommand on `topic` and emit a status line describing it.
    pub async fn send_command(&self, topic: Topic, command: Command) -> Result<usize> {
        let frame = self.outbound(command.to_frame_on(topic));
        let written = self.send_frame(&frame).await?;

        info!(%topic, id = command.id, identifier = command.identifier, value = command.value,
            "Sent command");
        self.emit_status(format!("Sent command {}", command));
        Ok(written)
    }

    /// Send a telecommand on the configured command topic.
    pub async fn send_telecommand(&self, command: Command) -> Result<usize> {
        self.send_command(self.config.command_topic, command).await
    }

    /// Encode and send a fully built frame. The header is sent as given; only the checksum
    /// is stamped when a policy is installed.
    pub async fn send_frame(&self, frame: &SatelliteFrame) -> Result<usize> {
        self.send_frame_to(frame, self.config.remote_addr).await
    }

    /// Send a frame to an explicit remote address.
    pub async fn send_frame_to(&self, frame: &SatelliteFrame, remote: SocketAddr) -> Result<usize> {
        let socket = self.socket_slot().clone();
        let Some(socket) = socket else {
            self.ingest.metrics().record_send_failure();
            warn!(topic = %frame.topic, "Send attempted on an unbound link");
            return Err(LinkError::NotBound);
        };

        let wire = match self.ingest.checksum_policy() {
            Some(policy) => codec::encode_with_checksum(frame, policy.as_ref()),
            None => codec::encode(frame),
        };

        match socket.send_to(&wire, remote).await {
            Ok(written) => {
                self.ingest.metrics().record_sent();
                trace!(topic = %frame.topic, %remote, written, "Frame sent");
                Ok(written)
            }
            Err(e) => {
                self.ingest.metrics().record_send_failure();
                warn!(topic = %frame.topic, %remote, error = %e, "Failed to send frame");
                Err(LinkError::send_io(format!("send to {} failed", remote), e))
            }
        }
    }

    /// Stamp the configured sender identity on an outbound frame.
    fn outbound(&self, frame: SatelliteFrame) -> SatelliteFrame {
        frame
            .from_sender(self.config.sender_node, self.config.sender_thread)
            .with_ttl(self.config.ttl)
    }

    // ---- status ----

    pub fn metrics(&self) -> MetricsSnapshot {
        self.ingest.metrics().snapshot()
    }

    fn emit_status(&self, message: String) {
        let _ = self.ingest.events().send(LinkEvent::status(message));
    }

    fn socket_slot(&self) -> MutexGuard<'_, Option<Arc<UdpSocket>>> {
        self.socket.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn driver_slot(&self) -> MutexGuard<'_, Option<DriverHandle>> {
        self.driver.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("local_addr", &self.local_addr())
            .field("remote_addr", &self.config.remote_addr)
            .field("receiving", &self.is_receiving())
            .field("ingest", &self.ingest)
            .finish()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        debug!("Dropping connection");
        self.closed.cancel();
        if let Some(driver) = self.driver_slot().take() {
            driver.cancel();
        }
    }
}
