//! Receive path: decode, filter, verify and queue inbound datagrams

use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;
use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::codec::{self, ChecksumPolicy};
use crate::error::DropReason;
use crate::events::LinkEvent;
use crate::filter::TopicFilter;
use crate::metrics::LinkMetrics;
use crate::provider::Datagram;
use crate::queue::{FrameQueue, ReceivedFrame};
use crate::types::Topic;

/// What happened to one inbound datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Queued; `evicted` is true if the oldest frame made room for it.
    Queued { topic: Topic, evicted: bool },
    Dropped(DropReason),
}

/// State shared between the receive driver and the [`Connection`](crate::Connection).
///
/// The filter and checksum policy can change while the driver runs; both sit behind short
/// synchronous locks that are never held across an await.
pub struct Ingest {
    filter: RwLock<TopicFilter>,
    checksum: RwLock<Option<Arc<dyn ChecksumPolicy>>>,
    queue: FrameQueue,
    metrics: Arc<LinkMetrics>,
    events: broadcast::Sender<LinkEvent>,
    last_received: Mutex<Option<Instant>>,
}

impl Ingest {
    pub fn new(
        filter: TopicFilter,
        queue: FrameQueue,
        metrics: Arc<LinkMetrics>,
        events: broadcast::Sender<LinkEvent>,
    ) -> Self {
        Self {
            filter: RwLock::new(filter),
            checksum: RwLock::new(None),
            queue,
            metrics,
            events,
            last_received: Mutex::new(None),
        }
    }

    /// Run one datagram through the receive path.
    pub fn process(&self, datagram: Datagram) -> IngestOutcome {
        let bytes = datagram.bytes;
        self.metrics.record_datagram(bytes.len());
        trace!(len = bytes.len(), peer = ?datagram.peer, "Datagram received");

        let frame = match codec::decode(&bytes) {
            Ok(frame) => frame,
            Err(e) => return self.drop_datagram(DropReason::from(e), Topic::default(), &e),
        };
        let topic = frame.topic;

        if !self.accepts(topic) {
            return self.drop_datagram(DropReason::TopicFiltered, topic, &"not subscribed");
        }

        if let Some(policy) = self.checksum_policy()
            && !codec::verify_checksum(&bytes, policy.as_ref())
        {
            return self.drop_datagram(DropReason::Checksum, topic, &"checksum mismatch");
        }

        let evicted = self.queue.push(ReceivedFrame::new(frame, datagram.peer)).is_some();
        if evicted {
            self.metrics.record_eviction();
            debug!(%topic, capacity = self.queue.capacity(), "Queue full, evicted oldest frame");
        }

        self.metrics.record_accepted();
        *self.last_received.lock().unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());

        // No subscribers is fine; readiness is also visible through the queue
        let _ = self.events.send(LinkEvent::DataReady { topic });

        IngestOutcome::Queued { topic, evicted }
    }

    fn drop_datagram(
        &self,
        reason: DropReason,
        topic: Topic,
        detail: &dyn std::fmt::Display,
    ) -> IngestOutcome {
        self.metrics.record_drop(reason);
        debug!(reason = reason.as_str(), %topic, %detail, "Dropped datagram");
        IngestOutcome::Dropped(reason)
    }

    pub fn accepts(&self, topic: Topic) -> bool {
        self.filter.read().unwrap_or_else(PoisonError::into_inner).accepts(topic)
    }

    /// Add a topic to the filter. Returns `true` if newly subscribed.
    pub fn subscribe(&self, topic: Topic) -> bool {
        self.filter.write().unwrap_or_else(PoisonError::into_inner).subscribe(topic)
    }

    pub fn subscribe_all<I>(&self, topics: I)
    where
        I: IntoIterator<Item = Topic>,
    {
        self.filter.write().unwrap_or_else(PoisonError::into_inner).subscribe_all(topics);
    }

    pub fn topics(&self) -> Vec<Topic> {
        self.filter.read().unwrap_or_else(PoisonError::into_inner).topics()
    }

    pub fn set_checksum(&self, policy: Option<Arc<dyn ChecksumPolicy>>) {
        *self.checksum.write().unwrap_or_else(PoisonError::into_inner) = policy;
    }

    pub fn checksum_policy(&self) -> Option<Arc<dyn ChecksumPolicy>> {
        self.checksum.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn queue(&self) -> &FrameQueue {
        &self.queue
    }

    pub fn metrics(&self) -> &Arc<LinkMetrics> {
        &self.metrics
    }

    pub fn events(&self) -> &broadcast::Sender<LinkEvent> {
        &self.events
    }

    /// Arrival time of the most recently queued frame.
    pub fn last_received(&self) -> Option<Instant> {
        *self.last_received.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Ingest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ingest")
            .field("topics", &self.topics())
            .field("checksum", &self.checksum_policy().is_some())
            .field("queued", &self.queue.len())
            .finish()
    }
}
