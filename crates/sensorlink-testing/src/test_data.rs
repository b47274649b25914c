//! Sensor reading payloads as devices send them.

use std::io::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::write::ZlibEncoder;
use flate2::Compression;

/// Pack raw samples as big-endian `u16`, zlib-compress and base64-encode.
pub fn encode_sensor_reading(samples: &[u16]) -> String {
    let raw: Vec<u8> = samples.iter().flat_map(|s| s.to_be_bytes()).collect();
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    // Writing into a Vec cannot fail.
    let _ = encoder.write_all(&raw);
    STANDARD.encode(encoder.finish().unwrap_or_default())
}
