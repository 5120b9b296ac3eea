//! Topic identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Routing key carried in every frame header.
///
/// The topic selects how a frame's payload is interpreted. Topics are open-ended on the
/// wire, so this is a newtype rather than an enum; the topics the satellite firmware
/// publishes are available as associated constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(pub u32);

impl Topic {
    /// Heartbeat counter.
    pub const COUNTER: Topic = Topic(5001);
    /// Inertial measurement unit sample.
    pub const SENSOR_IMU: Topic = Topic(5002);
    /// Power system and actuator status.
    pub const ELECTRICAL: Topic = Topic(5003);
    /// Debris mission event.
    pub const MISSION: Topic = Topic(5004);
    /// Raw light sensor reading.
    pub const LIGHT: Topic = Topic(5005);
    /// Uplink topic for telecommands.
    pub const TELECOMMAND: Topic = Topic(5555);

    /// All telemetry topics published by the satellite.
    pub const TELEMETRY: [Topic; 5] =
        [Topic::COUNTER, Topic::SENSOR_IMU, Topic::ELECTRICAL, Topic::MISSION, Topic::LIGHT];

    /// Raw topic identifier.
    pub const fn id(self) -> u32 {
        self.0
    }

    /// Human-readable name for known topics.
    pub fn name(self) -> Option<&'static str> {
        match self {
            Topic::COUNTER => Some("counter"),
            Topic::SENSOR_IMU => Some("sensor_imu"),
            Topic::ELECTRICAL => Some("electrical"),
            Topic::MISSION => Some("mission"),
            Topic::LIGHT => Some("light"),
            Topic::TELECOMMAND => Some("telecommand"),
            _ => None,
        }
    }
}

impl From<u32> for Topic {
    fn from(id: u32) -> Self {
        Topic(id)
    }
}

impl From<Topic> for u32 {
    fn from(topic: Topic) -> Self {
        topic.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}({})", name, self.0),
            None => write!(f, "{}", self.0),
        }
    }
}
