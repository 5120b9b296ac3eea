//! Satellite frame type

use bytes::Bytes;
use std::time::{SystemTime, UNIX_EPOCH};

use super::Topic;
use crate::error::FrameError;

/// Size of every frame on the wire.
pub const FRAME_LEN: usize = 1023;

/// Size of the fixed header preceding the payload.
pub const HEADER_LEN: usize = 26;

/// Largest payload a single frame can carry.
pub const MAX_USER_DATA_LEN: usize = 998;

/// One telemetry or telecommand record as carried in a single datagram.
///
/// Header fields are public; the payload is only reachable through constructors that
/// enforce the [`MAX_USER_DATA_LEN`] limit, so every `SatelliteFrame` value can be encoded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SatelliteFrame {
    /// Integrity field over bytes `2..FRAME_LEN` of the encoded frame.
    pub checksum: u16,

    /// Originating node identifier
    pub sender_node: u32,

    /// Sender-side time in milliseconds
    pub timestamp: u64,

    /// Originating task/thread identifier
    pub sender_thread: u32,

    /// Routing key selecting payload interpretation
    pub topic: Topic,

    /// Hop/validity budget. Carried, never enforced.
    pub ttl: u16,

    user_data: Bytes,
}

impl SatelliteFrame {
    /// Create a frame for `topic` carrying `user_data`, stamped with the current time.
    pub fn new(topic: Topic, user_data: impl Into<Bytes>) -> Result<Self, FrameError> {
        let mut frame = Self::with_user_data(user_data)?;
        frame.topic = topic;
        frame.timestamp = now_millis();
        Ok(frame)
    }

    /// Create a frame with zeroed header fields and the given payload.
    pub fn with_user_data(user_data: impl Into<Bytes>) -> Result<Self, FrameError> {
        let user_data = user_data.into();
        if user_data.len() > MAX_USER_DATA_LEN {
            return Err(FrameError::PayloadTooLong {
                len: user_data.len(),
                max: MAX_USER_DATA_LEN,
            });
        }
        Ok(Self { user_data, ..Self::default() })
    }

    /// Payload bytes, exactly `user_data_len()` long.
    pub fn user_data(&self) -> &[u8] {
        &self.user_data
    }

    /// Declared payload length.
    pub fn user_data_len(&self) -> u16 {
        // Bounded by MAX_USER_DATA_LEN at construction.
        self.user_data.len() as u16
    }

    /// Shared handle to the payload bytes.
    pub fn user_data_bytes(&self) -> Bytes {
        self.user_data.clone()
    }

    /// Builder-style setter for the sender identity.
    pub fn from_sender(mut self, node: u32, thread: u32) -> Self {
        self.sender_node = node;
        self.sender_thread = thread;
        self
    }

    /// Builder-style setter for the TTL.
    pub fn with_ttl(mut self, ttl: u16) -> Self {
        self.ttl = ttl;
        self
    }

    /// Builder-style setter for the timestamp.
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub(crate) fn from_parts(
        checksum: u16,
        sender_node: u32,
        timestamp: u64,
        sender_thread: u32,
        topic: Topic,
        ttl: u16,
        user_data: Bytes,
    ) -> Self {
        debug_assert!(user_data.len() <= MAX_USER_DATA_LEN);
        Self { checksum, sender_node, timestamp, sender_thread, topic, ttl, user_data }
    }
}

/// Milliseconds since the Unix epoch, saturating at zero for clocks set before it.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}
