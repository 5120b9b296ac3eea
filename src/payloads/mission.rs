//! Debris mission event record

use bytes::{Buf, BufMut, BytesMut};
use serde::{Deserialize, Serialize};

use super::{TopicPayload, get_bool};
use crate::types::Topic;

/// A debris part spotted or cleaned during the mission.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Mission {
    pub part_number: i32,
    /// Bearing of the part, rad
    pub angle: f32,
    pub is_cleaned: bool,
}

impl TopicPayload for Mission {
    const TOPIC: Topic = Topic::MISSION;
    const ENCODED_LEN: usize = 4 + 4 + 1;

    fn read_fields<B: Buf>(buf: &mut B) -> Self {
        Self { part_number: buf.get_i32_le(), angle: buf.get_f32_le(), is_cleaned: get_bool(buf) }
    }

    fn write_fields(&self, buf: &mut BytesMut) {
        buf.put_i32_le(self.part_number);
        buf.put_f32_le(self.angle);
        buf.put_u8(self.is_cleaned as u8);
    }
}
