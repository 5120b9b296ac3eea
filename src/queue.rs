//! Inbound frame queue
//!
//! [`InboundQueue`] is the bounded FIFO itself. [`FrameQueue`] is the shared hand-off point
//! between the receive task (producer) and the application (single consumer): a
//! mutex-guarded queue plus a [`Notify`] so the consumer can either poll or await.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::Notify;

use crate::types::SatelliteFrame;

/// Default number of frames held before the oldest is evicted.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// A decoded frame together with its arrival metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedFrame {
    pub frame: SatelliteFrame,
    /// Local arrival time, for staleness tracking
    pub received_at: Instant,
    /// Sender address when the source knows it
    pub peer: Option<SocketAddr>,
}

impl ReceivedFrame {
    pub fn new(frame: SatelliteFrame, peer: Option<SocketAddr>) -> Self {
        Self { frame, received_at: Instant::now(), peer }
    }
}

/// Bounded FIFO with drop-oldest overflow.
#[derive(Debug, Clone)]
pub struct InboundQueue<T = ReceivedFrame> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> InboundQueue<T> {
    /// Create a queue holding at most `capacity` items (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { items: VecDeque::with_capacity(capacity.min(DEFAULT_QUEUE_CAPACITY)), capacity }
    }

    /// Append an item, returning the evicted oldest item if the queue was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() >= self.capacity { self.items.pop_front() } else { None };
        self.items.push_back(item);
        evicted
    }

    /// Remove and return the oldest item.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T> Default for InboundQueue<T> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }
}

/// Shared single-consumer hand-off between the receive task and the application.
#[derive(Debug, Clone)]
pub struct FrameQueue {
    inner: Arc<FrameQueueInner>,
}

#[derive(Debug)]
struct FrameQueueInner {
    queue: Mutex<InboundQueue<ReceivedFrame>>,
    ready: Notify,
}

impl FrameQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(FrameQueueInner {
                queue: Mutex::new(InboundQueue::with_capacity(capacity)),
                ready: Notify::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, InboundQueue<ReceivedFrame>> {
        // A panic while holding the lock leaves the deque itself intact.
        self.inner.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueue a frame and wake the consumer. Returns the evicted frame on overflow.
    pub fn push(&self, frame: ReceivedFrame) -> Option<ReceivedFrame> {
        let evicted = self.lock().push(frame);
        self.inner.ready.notify_one();
        evicted
    }

    /// Dequeue the oldest frame without waiting.
    pub fn try_pop(&self) -> Option<ReceivedFrame> {
        self.lock().pop()
    }

    /// Wait for and dequeue the oldest frame.
    pub async fn pop(&self) -> ReceivedFrame {
        loop {
            let notified = self.inner.ready.notified();
            if let Some(frame) = self.try_pop() {
                return frame;
            }
            notified.await;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    /// Discard all queued frames, returning how many were dropped.
    pub fn clear(&self) -> usize {
        let mut queue = self.lock();
        let dropped = queue.len();
        queue.clear();
        dropped
    }
}

impl Default for FrameQueue {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }
}
