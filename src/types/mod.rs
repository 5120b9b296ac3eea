//! Core types for the telemetry link.
//!
//! ## Architecture
//!
//! - [`SatelliteFrame`] is one 1023-byte datagram: a 26-byte big-endian header and up to
//!   998 bytes of topic-specific payload
//! - [`Topic`] is the routing key selecting how a payload is interpreted
//! - [`UpdateRate`] controls how fast frame streams deliver to display consumers
//!
//! ## Usage Example
//!
//! ```rust
//! use groundlink::types::{SatelliteFrame, Topic, MAX_USER_DATA_LEN};
//!
//! let frame = SatelliteFrame::new(Topic::LIGHT, vec![0x2A, 0x00]).unwrap();
//! assert_eq!(frame.user_data_len(), 2);
//!
//! let too_long = SatelliteFrame::new(Topic::LIGHT, vec![0u8; MAX_USER_DATA_LEN + 1]);
//! assert!(too_long.is_err());
//! ```

mod frame;
mod topic;
mod update_rate;

pub use frame::{FRAME_LEN, HEADER_LEN, MAX_USER_DATA_LEN, SatelliteFrame};
pub(crate) use frame::now_millis;
pub use topic::Topic;
pub use update_rate::UpdateRate;
