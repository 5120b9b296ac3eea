//! Link events broadcast to collaborators

use serde::Serialize;
use std::fmt;
use std::time::SystemTime;

use crate::types::Topic;

/// Capacity of the event broadcast channel. Slow subscribers skip missed events.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Notification raised by the link.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LinkEvent {
    /// A frame on `topic` was queued and can be read.
    DataReady { topic: Topic },

    /// Human-readable status line for a ground station log view.
    Status(StatusLine),
}

/// Timestamped status message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusLine {
    pub at: SystemTime,
    pub message: String,
}

impl StatusLine {
    pub fn new(message: impl Into<String>) -> Self {
        Self { at: SystemTime::now(), message: message.into() }
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl LinkEvent {
    pub fn status(message: impl Into<String>) -> Self {
        LinkEvent::Status(StatusLine::new(message))
    }
}
