//! Typed views of frame payloads.
//!
//! Each telemetry topic carries one fixed-layout record. A decoder only reinterprets a
//! frame's payload when both the topic and the declared payload length match the record
//! exactly; anything else is treated as "record absent" rather than a garbage-filled value.
//!
//! # Wire contract
//!
//! Payload fields are written by the satellite in its native byte order (little-endian),
//! packed back to back with no alignment padding. Booleans occupy one byte, non-zero meaning
//! true. This differs from the frame header, which is big-endian.
//!
//! | record | topic | bytes |
//! |---|---|---|
//! | [`Counter`] | 5001 | 4 |
//! | [`SensorImu`] | 5002 | 45 |
//! | [`Electrical`] | 5003 | 21 |
//! | [`Mission`] | 5004 | 9 |
//! | [`Light`] | 5005 | 2 |
//! | [`Command`] | 5555 | 12 |
//!
//! # Example
//!
//! ```rust
//! use groundlink::payloads::{Electrical, SensorImu, TopicPayload};
//!
//! let status = Electrical { lightsensor_on: true, battery_voltage: 7.4, ..Default::default() };
//! let frame = status.to_frame();
//!
//! assert_eq!(Electrical::from_frame(&frame), Some(status));
//! // Wrong record for this topic: absent, never a partial read
//! assert_eq!(SensorImu::from_frame(&frame), None);
//! assert_eq!(SensorImu::from_frame_or_default(&frame), SensorImu::default());
//! ```

mod command;
mod counter;
mod electrical;
mod imu;
mod light;
mod mission;
mod telemetry;

pub use command::{Command, identifiers};
pub use counter::Counter;
pub use electrical::Electrical;
pub use imu::SensorImu;
pub use light::Light;
pub use mission::Mission;
pub use telemetry::Telemetry;

use bytes::{Buf, Bytes, BytesMut};

use crate::error::PayloadError;
use crate::types::{SatelliteFrame, Topic, now_millis};

/// A fixed-layout record carried as the payload of one topic.
pub trait TopicPayload: Sized + Default {
    /// Topic this record is published on.
    const TOPIC: Topic;

    /// Exact encoded size in bytes.
    const ENCODED_LEN: usize;

    /// Read the record's fields in wire order.
    ///
    /// Only called with at least [`ENCODED_LEN`](Self::ENCODED_LEN) bytes remaining.
    fn read_fields<B: Buf>(buf: &mut B) -> Self;

    /// Write the record's fields in wire order.
    fn write_fields(&self, buf: &mut BytesMut);

    /// Decode the record, explaining why a frame does not carry it.
    fn try_from_frame(frame: &SatelliteFrame) -> Result<Self, PayloadError> {
        if frame.topic != Self::TOPIC {
            return Err(PayloadError::TopicMismatch { expected: Self::TOPIC, found: frame.topic });
        }

        let mut payload = frame.user_data();
        if payload.len() != Self::ENCODED_LEN {
            return Err(PayloadError::LengthMismatch {
                topic: Self::TOPIC,
                expected: Self::ENCODED_LEN,
                found: payload.len(),
            });
        }

        Ok(Self::read_fields(&mut payload))
    }

    /// Decode the record if the frame carries it.
    fn from_frame(frame: &SatelliteFrame) -> Option<Self> {
        Self::try_from_frame(frame).ok()
    }

    /// Best-effort decode that never fails.
    ///
    /// Returns the all-zero record when the frame does not carry this record. Callers must
    /// treat that value as "not present", not as a genuine zero reading.
    fn from_frame_or_default(frame: &SatelliteFrame) -> Self {
        Self::from_frame(frame).unwrap_or_default()
    }

    /// Encode the record as a payload.
    fn to_payload(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::ENCODED_LEN);
        self.write_fields(&mut buf);
        debug_assert_eq!(buf.len(), Self::ENCODED_LEN);
        buf.freeze()
    }

    /// Wrap the record in a frame on its own topic, stamped with the current time.
    fn to_frame(&self) -> SatelliteFrame {
        self.to_frame_on(Self::TOPIC)
    }

    /// Wrap the record in a frame on an arbitrary topic, stamped with the current time.
    fn to_frame_on(&self, topic: Topic) -> SatelliteFrame {
        SatelliteFrame::from_parts(0, 0, now_millis(), 0, topic, 0, self.to_payload())
    }
}

pub(crate) fn get_bool<B: Buf>(buf: &mut B) -> bool {
    buf.get_u8() != 0
}
