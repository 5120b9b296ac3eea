//! Light sensor record

use bytes::{Buf, BufMut, BytesMut};
use serde::{Deserialize, Serialize};

use super::TopicPayload;
use crate::types::Topic;

/// Raw light sensor reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Light {
    pub light_value: u16,
}

impl TopicPayload for Light {
    const TOPIC: Topic = Topic::LIGHT;
    const ENCODED_LEN: usize = 2;

    fn read_fields<B: Buf>(buf: &mut B) -> Self {
        Self { light_value: buf.get_u16_le() }
    }

    fn write_fields(&self, buf: &mut BytesMut) {
        buf.put_u16_le(self.light_value);
    }
}
