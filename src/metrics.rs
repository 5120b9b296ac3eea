//! Link counters
//!
//! Per-datagram failures on the receive path are not errors the application sees; they are
//! counted here so a ground station can still tell a quiet link from a noisy one.

use serde::{Deserialize, Serialize};
use std::array;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::DropReason;

#[derive(Debug)]
pub struct LinkMetrics {
    datagrams_total: AtomicU64,
    bytes_total: AtomicU64,
    frames_accepted: AtomicU64,
    drops_total: [AtomicU64; DropReason::ALL.len()],
    queue_evictions: AtomicU64,
    frames_sent: AtomicU64,
    send_failures: AtomicU64,
}

impl Default for LinkMetrics {
    fn default() -> Self {
        Self {
            datagrams_total: AtomicU64::new(0),
            bytes_total: AtomicU64::new(0),
            frames_accepted: AtomicU64::new(0),
            drops_total: array::from_fn(|_| AtomicU64::new(0)),
            queue_evictions: AtomicU64::new(0),
            frames_sent: AtomicU64::new(0),
            send_failures: AtomicU64::new(0),
        }
    }
}

impl LinkMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_datagram(&self, bytes: usize) {
        self.datagrams_total.fetch_add(1, Ordering::Relaxed);
        self.bytes_total.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn record_accepted(&self) {
        self.frames_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_drop(&self, reason: DropReason) {
        self.drops_total[reason.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_eviction(&self) {
        self.queue_evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sent(&self) {
        self.frames_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_send_failure(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn drops(&self, reason: DropReason) -> u64 {
        self.drops_total[reason.index()].load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            datagrams_total: self.datagrams_total.load(Ordering::Relaxed),
            bytes_total: self.bytes_total.load(Ordering::Relaxed),
            frames_accepted: self.frames_accepted.load(Ordering::Relaxed),
            dropped_too_short: self.drops(DropReason::TooShort),
            dropped_topic_filtered: self.drops(DropReason::TopicFiltered),
            dropped_checksum: self.drops(DropReason::Checksum),
            queue_evictions: self.queue_evictions.load(Ordering::Relaxed),
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`LinkMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub datagrams_total: u64,
    pub bytes_total: u64,
    pub frames_accepted: u64,
    pub dropped_too_short: u64,
    pub dropped_topic_filtered: u64,
    pub dropped_checksum: u64,
    pub queue_evictions: u64,
    pub frames_sent: u64,
    pub send_failures: u64,
}

impl MetricsSnapshot {
    pub fn dropped_total(&self) -> u64 {
        self.dropped_too_short + self.dropped_topic_filtered + self.dropped_checksum
    }
}
