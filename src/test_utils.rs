//! Test utilities for building frames and datagrams
//!
//! Shared by unit tests and the benchmarks; compiled only for tests or with the
//! `benchmark` feature.

#![cfg(any(test, feature = "benchmark"))]

use crate::codec;
use crate::payloads::{Counter, Electrical, Light, Mission, SensorImu, TopicPayload};
use crate::types::{FRAME_LEN, MAX_USER_DATA_LEN, SatelliteFrame, Topic};

/// Fixed timestamp so fixtures compare equal across runs.
pub const FIXTURE_TIMESTAMP: u64 = 1_700_000_000_000;

/// Electrical record with the light sensor on and a 7.4 V battery.
pub fn sample_electrical() -> Electrical {
    Electrical {
        lightsensor_on: true,
        battery_current: 0.42,
        battery_voltage: 7.4,
        solar_panel_current: 0.1,
        solar_panel_voltage: 5.2,
        ..Default::default()
    }
}

/// Frame on `topic` with `len` bytes of a repeating pattern.
pub fn patterned_frame(topic: Topic, len: usize) -> SatelliteFrame {
    let payload: Vec<u8> = (0..len.min(MAX_USER_DATA_LEN)).map(|i| (i % 251) as u8).collect();
    SatelliteFrame::from_parts(0, 1, FIXTURE_TIMESTAMP, 0, topic, 0, payload.into())
}

/// One encoded frame per telemetry topic, in topic order.
pub fn telemetry_datagrams() -> Vec<Vec<u8>> {
    let frames = [
        Counter { counter: 42 }.to_frame(),
        SensorImu::default().to_frame(),
        sample_electrical().to_frame(),
        Mission::default().to_frame(),
        Light { light_value: 512 }.to_frame(),
    ];
    frames.iter().map(|frame| codec::encode(frame).to_vec()).collect()
}

/// Datagram too short to hold a frame.
pub fn truncated_datagram() -> Vec<u8> {
    vec![0u8; FRAME_LEN - 1]
}
