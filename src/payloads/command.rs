//! Telecommand payload

use bytes::{Buf, BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::TopicPayload;
use crate::types::Topic;

/// An outbound intent for the satellite.
///
/// Serialized as three little-endian `i32` values into the payload of a frame addressed to
/// the telecommand topic. There is no acknowledgement path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Command {
    /// Subsystem group, 1 to 5 on current firmware
    pub id: i32,
    /// Operation within the group, see [`identifiers`]
    pub identifier: i32,
    pub value: i32,
}

impl Command {
    pub fn new(id: i32, identifier: i32, value: i32) -> Self {
        Self { id, identifier, value }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "id={} identifier={} value={}", self.id, self.identifier, self.value)
    }
}

impl TopicPayload for Command {
    const TOPIC: Topic = Topic::TELECOMMAND;
    const ENCODED_LEN: usize = 3 * 4;

    fn read_fields<B: Buf>(buf: &mut B) -> Self {
        Self { id: buf.get_i32_le(), identifier: buf.get_i32_le(), value: buf.get_i32_le() }
    }

    fn write_fields(&self, buf: &mut BytesMut) {
        buf.put_i32_le(self.id);
        buf.put_i32_le(self.identifier);
        buf.put_i32_le(self.value);
    }
}

/// Command identifiers understood by the satellite firmware.
///
/// Identifiers are grouped by thousands: the leading digit names the subsystem.
pub mod identifiers {
    /// Start magnetometer calibration.
    pub const CALIBRATE_MAGNETOMETER: i32 = 1001;
    /// Start accelerometer calibration.
    pub const CALIBRATE_ACCELEROMETER: i32 = 1002;
    /// Start gyroscope calibration.
    pub const CALIBRATE_GYROSCOPE: i32 = 1003;

    /// Rotate by the given angle in degrees, -360 to 360.
    pub const ATTITUDE_ROTATE: i32 = 2001;
    /// Hold the given orientation in degrees, 0 to 360.
    pub const ATTITUDE_ORIENTATION: i32 = 2002;
    /// Start (1) or stop (0) the attitude controller.
    pub const ATTITUDE_CONTROLLER: i32 = 2003;

    /// Move racks: 1 deploy, -1 pull in, 0 stop.
    pub const RACKS: i32 = 3001;
    /// Electromagnet on (1) or off (0).
    pub const ELECTROMAGNET: i32 = 3002;
    /// Thermal knife on (1) or off (0).
    pub const THERMAL_KNIFE: i32 = 3003;
    /// Main motor on (1) or off (0).
    pub const MAIN_MOTOR: i32 = 3004;

    /// Take a picture.
    pub const TAKE_PICTURE: i32 = 4001;

    /// Start the sun acquisition routine.
    pub const SUN_FINDER: i32 = 5001;
    /// Start (1) or abort (0) the debris mission.
    pub const MISSION: i32 = 5002;
    /// Activate the satellite.
    pub const ACTIVATE: i32 = 5003;
    /// Leave calibration mode.
    pub const EXIT_CALIBRATION: i32 = 5004;
}
