//! Topic-dispatched telemetry decoding

use serde::{Deserialize, Serialize};

use super::{Counter, Electrical, Light, Mission, SensorImu, TopicPayload};
use crate::types::{SatelliteFrame, Topic};

/// Any telemetry record, selected by the frame's topic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Telemetry {
    Counter(Counter),
    SensorImu(SensorImu),
    Electrical(Electrical),
    Light(Light),
    Mission(Mission),
}

impl Telemetry {
    /// Decode whichever record the frame's topic announces.
    ///
    /// Returns `None` for unknown topics and for known topics whose payload length does not
    /// match the record.
    pub fn decode(frame: &SatelliteFrame) -> Option<Self> {
        match frame.topic {
            Topic::COUNTER => Counter::from_frame(frame).map(Telemetry::Counter),
            Topic::SENSOR_IMU => SensorImu::from_frame(frame).map(Telemetry::SensorImu),
            Topic::ELECTRICAL => Electrical::from_frame(frame).map(Telemetry::Electrical),
            Topic::LIGHT => Light::from_frame(frame).map(Telemetry::Light),
            Topic::MISSION => Mission::from_frame(frame).map(Telemetry::Mission),
            _ => None,
        }
    }

    /// Topic this record travels on.
    pub fn topic(&self) -> Topic {
        match self {
            Telemetry::Counter(_) => Counter::TOPIC,
            Telemetry::SensorImu(_) => SensorImu::TOPIC,
            Telemetry::Electrical(_) => Electrical::TOPIC,
            Telemetry::Light(_) => Light::TOPIC,
            Telemetry::Mission(_) => Mission::TOPIC,
        }
    }

    /// Wrap the record in a frame on its topic.
    pub fn to_frame(&self) -> SatelliteFrame {
        match self {
            Telemetry::Counter(record) => record.to_frame(),
            Telemetry::SensorImu(record) => record.to_frame(),
            Telemetry::Electrical(record) => record.to_frame(),
            Telemetry::Light(record) => record.to_frame(),
            Telemetry::Mission(record) => record.to_frame(),
        }
    }
}
