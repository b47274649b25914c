//! Payload codec.
//!
//! Outbound command payloads are JSON. Inbound sensor readings arrive as a
//! base64 string wrapping a zlib stream; the inflated buffer is a fixed grid
//! of big-endian `u16` samples:
//!
//! ```text
//! row 0:  [acc_x][acc_y][acc_z][gyr_x][gyr_y][gyr_z]   2 bytes each
//! row 1:  ...
//! row sequence_length - 1
//! ```
//!
//! Channels `0..=2` are accelerometer axes, the remaining channels are
//! gyroscope axes. The scale factors are fixed by the sensor hardware.

use std::io::Read;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::read::ZlibDecoder;
use serde_json::{Map, Value};

use crate::decode_err;
use crate::error::Result;
use crate::event::SensorReading;
use crate::types::Command;

/// Accelerometer full-scale range setting (±2^(RANGE+1) g).
pub const ACC_RANGE: i32 = 2;
/// Standard gravity in m/s².
pub const GRAVITY: f64 = 9.80665;
/// Gyroscope full-scale range in °/s.
pub const GYR_RANGE: f64 = 250.0;
/// Number of leading accelerometer channels in a sample.
pub const ACC_CHANNELS: usize = 3;

const FULL_SCALE: f64 = 32768.0;

/// Default number of samples in a reading.
pub const DEFAULT_SEQUENCE_LENGTH: usize = 500;
/// Default number of channels per sample.
pub const DEFAULT_SAMPLE_SIZE: usize = 6;

/// Meters per second squared per raw accelerometer unit.
pub fn acc_scale() -> f64 {
    2f64.powi(ACC_RANGE + 1) * GRAVITY / FULL_SCALE
}

/// Radians per second per raw gyroscope unit.
pub fn gyr_scale() -> f64 {
    GYR_RANGE * (std::f64::consts::PI / 180.0) / FULL_SCALE
}

/// Shape of the raw sample grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorReadingLayout {
    pub sequence_length: usize,
    pub sample_size: usize,
}

impl SensorReadingLayout {
    pub fn new(sequence_length: usize, sample_size: usize) -> Self {
        Self {
            sequence_length,
            sample_size,
        }
    }

    /// Exact size of the inflated buffer.
    pub fn byte_len(&self) -> usize {
        self.sequence_length * self.sample_size * 2
    }
}

impl Default for SensorReadingLayout {
    fn default() -> Self {
        Self::new(DEFAULT_SEQUENCE_LENGTH, DEFAULT_SAMPLE_SIZE)
    }
}

/// Serialize the MQTT payload of a command.
///
/// SET commands carry `{"<resource>": <value>}`, GET commands an empty object.
pub fn encode_command_payload(command: &Command) -> Result<Vec<u8>> {
    let mut body = Map::new();
    if let Some(value) = command.value() {
        body.insert(
            command.resource().as_str().to_string(),
            serde_json::to_value(value)?,
        );
    }
    Ok(serde_json::to_vec(&Value::Object(body))?)
}

/// Convert a raw channel value to physical units.
pub fn to_physical(channel: usize, raw: u16) -> f64 {
    if channel < ACC_CHANNELS {
        f64::from(raw) * acc_scale()
    } else {
        f64::from(raw) * gyr_scale()
    }
}

/// Decode a compressed, base64-encoded sensor reading.
///
/// The result carries a freshly generated reading UUID.
pub fn decode_sensor_reading(encoded: &str, layout: SensorReadingLayout) -> Result<SensorReading> {
    let compressed = STANDARD.decode(encoded.trim())?;

    let mut raw = Vec::with_capacity(layout.byte_len());
    ZlibDecoder::new(compressed.as_slice())
        .read_to_end(&mut raw)
        .map_err(|e| decode_err!("zlib: {}", e))?;

    if raw.len() != layout.byte_len() {
        return Err(decode_err!(
            "expected {} bytes ({} x {} x 2), got {}",
            layout.byte_len(),
            layout.sequence_length,
            layout.sample_size,
            raw.len()
        ));
    }

    let values = raw
        .chunks_exact(layout.sample_size * 2)
        .map(|row| {
            row.chunks_exact(2)
                .enumerate()
                .map(|(channel, pair)| to_physical(channel, u16::from_be_bytes([pair[0], pair[1]])))
                .collect()
        })
        .collect();

    Ok(SensorReading::new(values))
}
