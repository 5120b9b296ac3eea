//! Heartbeat counter record

use bytes::{Buf, BufMut, BytesMut};
use serde::{Deserialize, Serialize};

use super::TopicPayload;
use crate::types::Topic;

/// Monotonic heartbeat counter published by the satellite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Counter {
    pub counter: i32,
}

impl TopicPayload for Counter {
    const TOPIC: Topic = Topic::COUNTER;
    const ENCODED_LEN: usize = 4;

    fn read_fields<B: Buf>(buf: &mut B) -> Self {
        Self { counter: buf.get_i32_le() }
    }

    fn write_fields(&self, buf: &mut BytesMut) {
        buf.put_i32_le(self.counter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SatelliteFrame;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_counter_survives_framing(counter in any::<i32>()) {
            let frame = Counter { counter }.to_frame();
            prop_assert_eq!(Counter::from_frame(&frame), Some(Counter { counter }));
        }
    }

    #[test]
    fn counter_is_little_endian() {
        let frame = SatelliteFrame::new(Topic::COUNTER, vec![0x01, 0x02, 0x00, 0x00]).unwrap();
        assert_eq!(Counter::from_frame(&frame), Some(Counter { counter: 0x0201 }));
    }
}
