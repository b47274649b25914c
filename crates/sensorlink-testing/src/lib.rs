//! Testing utilities for SensorLink
//!
//! This crate provides test doubles for the bridge seams:
//! - Recording publisher and forwarder with failure injection
//! - A slow forwarder that measures concurrent deliveries
//! - Encoders for compressed sensor readings

pub mod recording;
pub mod slow;
pub mod test_data;

pub use recording::{PublishRecord, RecordingForwarder, RecordingPublisher};
pub use slow::SlowForwarder;
pub use test_data::encode_sensor_reading;
