//! Wire codec for satellite frames.
//!
//! ## Frame layout
//!
//! Every datagram is one 1023-byte frame. All header fields are big-endian:
//!
//! ```text
//! offset  size  field
//!      0     2  checksum
//!      2     4  sender_node
//!      6     8  timestamp (ms)
//!     14     4  sender_thread
//!     18     4  topic
//!     22     2  ttl
//!     24     2  user_data_len (<= 998)
//!     26   ...  user_data, zero padded
//! ```
//!
//! A full 998-byte payload ends one byte past the nominal frame size. [`encode`] grows the
//! buffer by that byte when needed, and [`decode`] never reads past the end of the buffer it
//! was handed, so a 1023-byte datagram declaring 998 bytes yields the 997 that arrived.
//!
//! Both directions are pure and allocation-light: decoding copies exactly the declared
//! payload, encoding writes into a single buffer.

pub mod checksum;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::error::FrameError;
use crate::types::{FRAME_LEN, HEADER_LEN, MAX_USER_DATA_LEN, SatelliteFrame, Topic};

pub use checksum::{ChecksumPolicy, FnChecksum};

/// Byte range covered by the checksum field.
pub const CHECKSUM_COVERAGE_START: usize = 2;

/// Decode one frame from a raw datagram.
///
/// Fails with [`FrameError::TooShort`] before reading any field when the buffer is shorter
/// than [`FRAME_LEN`]. Payload content never causes a failure; the declared payload length
/// is clamped to [`MAX_USER_DATA_LEN`] and to the bytes actually present.
pub fn decode(buffer: &[u8]) -> Result<SatelliteFrame, FrameError> {
    if buffer.len() < FRAME_LEN {
        return Err(FrameError::TooShort { len: buffer.len(), expected: FRAME_LEN });
    }

    let mut header = &buffer[..HEADER_LEN];
    let checksum = header.get_u16();
    let sender_node = header.get_u32();
    let timestamp = header.get_u64();
    let sender_thread = header.get_u32();
    let topic = Topic(header.get_u32());
    let ttl = header.get_u16();
    let declared_len = header.get_u16() as usize;

    let available = buffer.len() - HEADER_LEN;
    let user_data_len = declared_len.min(MAX_USER_DATA_LEN).min(available);
    if user_data_len != declared_len {
        trace!(declared_len, user_data_len, "Clamped declared payload length");
    }

    let user_data = Bytes::copy_from_slice(&buffer[HEADER_LEN..HEADER_LEN + user_data_len]);

    Ok(SatelliteFrame::from_parts(
        checksum,
        sender_node,
        timestamp,
        sender_thread,
        topic,
        ttl,
        user_data,
    ))
}

/// Encode a frame into its wire representation.
///
/// The result is [`FRAME_LEN`] bytes, or one more for a full 998-byte payload. Firmware
/// that strictly checks datagram length may reject such a frame.
pub fn encode(frame: &SatelliteFrame) -> Bytes {
    let payload = frame.user_data();
    let total_len = FRAME_LEN.max(HEADER_LEN + payload.len());

    let mut buf = BytesMut::with_capacity(total_len);
    buf.put_u16(frame.checksum);
    buf.put_u32(frame.sender_node);
    buf.put_u64(frame.timestamp);
    buf.put_u32(frame.sender_thread);
    buf.put_u32(frame.topic.id());
    buf.put_u16(frame.ttl);
    buf.put_u16(frame.user_data_len());
    buf.put_slice(payload);
    buf.resize(total_len, 0);

    buf.freeze()
}

/// Encode a frame after stamping its checksum with `policy`.
///
/// The checksum covers everything after the checksum field itself, so the frame is encoded
/// once, the checksum computed over bytes `2..`, and the field patched in place.
pub fn encode_with_checksum(frame: &SatelliteFrame, policy: &dyn ChecksumPolicy) -> Bytes {
    let mut buf = BytesMut::from(encode(frame).as_ref());
    let checksum = policy.compute(&buf[CHECKSUM_COVERAGE_START..]);
    buf[..CHECKSUM_COVERAGE_START].copy_from_slice(&checksum.to_be_bytes());
    buf.freeze()
}

/// Check a raw datagram's checksum field against `policy`.
///
/// Callers should have decoded the datagram first; buffers shorter than a frame fail.
pub fn verify_checksum(buffer: &[u8], policy: &dyn ChecksumPolicy) -> bool {
    if buffer.len() < FRAME_LEN {
        return false;
    }
    let declared = u16::from_be_bytes([buffer[0], buffer[1]]);
    policy.compute(&buffer[CHECKSUM_COVERAGE_START..]) == declared
}
