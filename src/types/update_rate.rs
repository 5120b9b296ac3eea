//! Delivery rate control for frame streams

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Delivery rate for frame streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateRate {
    /// Every accepted frame, in arrival order
    Native,

    /// At most this many frames per second, latest wins.
    /// Intended for display consumers that only need the freshest sample.
    /// `Max(0)` is treated as `Native`.
    Max(u32),
}

impl UpdateRate {
    /// Normalize degenerate rates
    pub fn normalize(self) -> Self {
        match self {
            UpdateRate::Max(0) => UpdateRate::Native,
            other => other,
        }
    }

    /// Check if throttling is needed
    pub fn needs_throttle(self) -> bool {
        matches!(self.normalize(), UpdateRate::Max(_))
    }

    /// Get throttle interval if needed
    pub fn throttle_interval(self) -> Option<Duration> {
        match self.normalize() {
            UpdateRate::Native => None,
            UpdateRate::Max(hz) => Some(Duration::from_secs_f64(1.0 / hz as f64)),
        }
    }
}
