//! Power system and actuator status record

use bytes::{Buf, BufMut, BytesMut};
use serde::{Deserialize, Serialize};

use super::{TopicPayload, get_bool};
use crate::types::Topic;

/// Actuator states and power readings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Electrical {
    pub lightsensor_on: bool,
    pub electromagnet_on: bool,
    pub thermal_knife_on: bool,
    pub racks_out: bool,
    pub solar_panels_out: bool,
    /// mA
    pub battery_current: f32,
    /// V
    pub battery_voltage: f32,
    /// mA
    pub solar_panel_current: f32,
    /// V
    pub solar_panel_voltage: f32,
}

impl Electrical {
    /// Battery power draw in watts.
    pub fn battery_power(&self) -> f32 {
        self.battery_voltage * self.battery_current / 1000.0
    }
}

impl TopicPayload for Electrical {
    const TOPIC: Topic = Topic::ELECTRICAL;
    const ENCODED_LEN: usize = 5 + 4 * 4;

    fn read_fields<B: Buf>(buf: &mut B) -> Self {
        Self {
            lightsensor_on: get_bool(buf),
            electromagnet_on: get_bool(buf),
            thermal_knife_on: get_bool(buf),
            racks_out: get_bool(buf),
            solar_panels_out: get_bool(buf),
            battery_current: buf.get_f32_le(),
            battery_voltage: buf.get_f32_le(),
            solar_panel_current: buf.get_f32_le(),
            solar_panel_voltage: buf.get_f32_le(),
        }
    }

    fn write_fields(&self, buf: &mut BytesMut) {
        for flag in [
            self.lightsensor_on,
            self.electromagnet_on,
            self.thermal_knife_on,
            self.racks_out,
            self.solar_panels_out,
        ] {
            buf.put_u8(flag as u8);
        }
        buf.put_f32_le(self.battery_current);
        buf.put_f32_le(self.battery_voltage);
        buf.put_f32_le(self.solar_panel_current);
        buf.put_f32_le(self.solar_panel_voltage);
    }
}
