//! Link staleness tracking

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Silence after which the link is considered lost.
pub const LINK_LOST_AFTER: Duration = Duration::from_secs(3);

/// Observed state of the downlink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkStatus {
    /// No frame seen yet
    Waiting,
    Online,
    Lost,
}

impl LinkStatus {
    /// Status line shown to the operator on a transition.
    pub fn message(self) -> &'static str {
        match self {
            LinkStatus::Waiting => "Waiting for telemetry.",
            LinkStatus::Online => "Telemetry online.",
            LinkStatus::Lost => "Telemetry lost.",
        }
    }
}

/// Consumer-side online/lost tracker
///
/// Feed it arrival times (from [`Connection::last_received`](super::Connection::last_received)
/// or frame by frame) and poll it periodically; it reports each transition once.
#[derive(Debug, Clone)]
pub struct LinkMonitor {
    threshold: Duration,
    status: LinkStatus,
    last_frame: Option<Instant>,
}

impl Default for LinkMonitor {
    fn default() -> Self {
        Self::with_threshold(LINK_LOST_AFTER)
    }
}

impl LinkMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(threshold: Duration) -> Self {
        Self { threshold, status: LinkStatus::Waiting, last_frame: None }
    }

    pub fn status(&self) -> LinkStatus {
        self.status
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Record a frame arrival. Returns [`LinkStatus::Online`] if the link just came up.
    pub fn frame_received(&mut self, at: Instant) -> Option<LinkStatus> {
        if self.last_frame.is_none_or(|last| at > last) {
            self.last_frame = Some(at);
        }
        self.transition(LinkStatus::Online)
    }

    /// Check for silence at `now`. Returns [`LinkStatus::Lost`] on the transition.
    pub fn poll(&mut self, now: Instant) -> Option<LinkStatus> {
        match (self.status, self.last_frame) {
            (LinkStatus::Online, Some(last)) if now.saturating_duration_since(last) > self.threshold => {
                self.transition(LinkStatus::Lost)
            }
            _ => None,
        }
    }

    /// Combine an arrival time from the connection with a silence check.
    ///
    /// A `last_received` newer than anything seen counts as a fresh frame.
    pub fn observe(&mut self, last_received: Option<Instant>, now: Instant) -> Option<LinkStatus> {
        if let Some(at) = last_received
            && self.last_frame.is_none_or(|seen| at > seen)
            && now.saturating_duration_since(at) <= self.threshold
            && let Some(status) = self.frame_received(at)
        {
            return Some(status);
        }
        self.poll(now)
    }

    fn transition(&mut self, next: LinkStatus) -> Option<LinkStatus> {
        if self.status == next {
            return None;
        }
        self.status = next;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn online_then_lost_after_three_seconds() {
        let start = Instant::now();
        let mut monitor = LinkMonitor::new();
        assert_eq!(monitor.status(), LinkStatus::Waiting);
        assert_eq!(monitor.poll(start + Duration::from_secs(10)), None);

        assert_eq!(monitor.frame_received(start), Some(LinkStatus::Online));
        assert_eq!(monitor.frame_received(start + Duration::from_secs(1)), None);

        assert_eq!(monitor.poll(start + Duration::from_secs(3)), None);
        assert_eq!(monitor.poll(start + Duration::from_millis(4100)), Some(LinkStatus::Lost));
        assert_eq!(monitor.poll(start + Duration::from_secs(5)), None);
        assert_eq!(LinkStatus::Lost.message(), "Telemetry lost.");

        assert_eq!(monitor.frame_received(start + Duration::from_secs(6)), Some(LinkStatus::Online));
        assert_eq!(LinkStatus::Online.message(), "Telemetry online.");
    }

    #[test]
    fn observe_ignores_stale_arrivals() {
        let start = Instant::now();
        let mut monitor = LinkMonitor::with_threshold(Duration::from_secs(3));

        // A frame from long before the monitor started does not bring the link online
        assert_eq!(monitor.observe(Some(start), start + Duration::from_secs(10)), None);
        assert_eq!(monitor.status(), LinkStatus::Waiting);

        let fresh = start + Duration::from_secs(11);
        assert_eq!(monitor.observe(Some(fresh), fresh), Some(LinkStatus::Online));
        assert_eq!(monitor.observe(Some(fresh), fresh + Duration::from_secs(1)), None);
        assert_eq!(
            monitor.observe(Some(fresh), fresh + Duration::from_secs(4)),
            Some(LinkStatus::Lost)
        );
    }
}
