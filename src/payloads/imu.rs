//! Inertial measurement unit record

use bytes::{Buf, BufMut, BytesMut};
use serde::{Deserialize, Serialize};

use super::{TopicPayload, get_bool};
use crate::types::Topic;

/// One fused IMU sample.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorImu {
    /// Acceleration, milli-g
    pub ax: f32,
    pub ay: f32,
    pub az: f32,
    /// Angular rate, rad/s
    pub wx: f32,
    pub wy: f32,
    pub wz: f32,
    /// Attitude, rad
    pub roll: f32,
    pub pitch: f32,
    /// Heading estimates, rad
    pub heading_fusion: f32,
    pub heading_xm: f32,
    pub heading_gyro: f32,
    /// Set while the on-board calibration routine runs
    pub calibration_active: bool,
}

impl TopicPayload for SensorImu {
    const TOPIC: Topic = Topic::SENSOR_IMU;
    const ENCODED_LEN: usize = 11 * 4 + 1;

    fn read_fields<B: Buf>(buf: &mut B) -> Self {
        Self {
            ax: buf.get_f32_le(),
            ay: buf.get_f32_le(),
            az: buf.get_f32_le(),
            wx: buf.get_f32_le(),
            wy: buf.get_f32_le(),
            wz: buf.get_f32_le(),
            roll: buf.get_f32_le(),
            pitch: buf.get_f32_le(),
            heading_fusion: buf.get_f32_le(),
            heading_xm: buf.get_f32_le(),
            heading_gyro: buf.get_f32_le(),
            calibration_active: get_bool(buf),
        }
    }

    fn write_fields(&self, buf: &mut BytesMut) {
        for value in [
            self.ax,
            self.ay,
            self.az,
            self.wx,
            self.wy,
            self.wz,
            self.roll,
            self.pitch,
            self.heading_fusion,
            self.heading_xm,
            self.heading_gyro,
        ] {
            buf.put_f32_le(value);
        }
        buf.put_u8(self.calibration_active as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SatelliteFrame;
    use crate::payloads::Electrical;

    fn sample() -> SensorImu {
        SensorImu {
            ax: 12.5,
            ay: -3.0,
            az: 998.0,
            wx: 0.1,
            wy: -0.2,
            wz: 0.3,
            roll: 0.01,
            pitch: -0.02,
            heading_fusion: 1.57,
            heading_xm: 1.5,
            heading_gyro: 1.6,
            calibration_active: true,
        }
    }

    #[test]
    fn fields_are_read_in_wire_order() {
        let mut payload = Vec::new();
        for i in 0..11 {
            payload.extend_from_slice(&(i as f32).to_le_bytes());
        }
        payload.push(1);
        let frame = SatelliteFrame::new(Topic::SENSOR_IMU, payload).unwrap();

        let imu = SensorImu::from_frame(&frame).unwrap();
        assert_eq!(imu.ax, 0.0);
        assert_eq!(imu.wx, 3.0);
        assert_eq!(imu.pitch, 7.0);
        assert_eq!(imu.heading_gyro, 10.0);
        assert!(imu.calibration_active);
    }

    #[test]
    fn sample_survives_framing() {
        let frame = sample().to_frame();
        assert_eq!(SensorImu::from_frame(&frame), Some(sample()));
    }

    #[test]
    fn electrical_frame_yields_absent_imu() {
        let frame = Electrical { racks_out: true, ..Default::default() }.to_frame();
        assert_eq!(SensorImu::from_frame(&frame), None);
        assert_eq!(SensorImu::from_frame_or_default(&frame), SensorImu::default());
    }

    #[test]
    fn wrong_length_yields_absent_imu() {
        let mut payload = sample().to_payload().to_vec();
        payload.pop();
        let frame = SatelliteFrame::new(Topic::SENSOR_IMU, payload).unwrap();
        assert_eq!(SensorImu::from_frame_or_default(&frame), SensorImu::default());
    }
}
