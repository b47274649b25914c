//! Core types for SensorLink.
//!
//! This crate holds the device protocol: the topic grammar, the payload codec
//! (including the compressed sensor-reading format), the events forwarded
//! upstream, configuration and the unified error type. It does no I/O.

pub mod codec;
pub mod config;
pub mod error;
pub mod event;
pub mod topic;
pub mod types;

pub use codec::{decode_sensor_reading, encode_command_payload, SensorReadingLayout};
pub use config::GatewayConfig;
pub use error::{Error, Result};
pub use event::{
    ExportEnvelope, ExportMetadata, InferenceDescriptor, InferenceLatencyBenchmark,
    PredictionRequest, PredictionResult, ResponseEnvelope, ResponseMetadata, SensorReading,
    UpstreamEndpoint, UpstreamEvent,
};
pub use topic::{
    decode_topic, encode_command_topic, topic_matches_filter, ParsedTopic, TopicFamily,
};
pub use types::{
    Command, CommandTarget, DispatchedCommand, InferenceLayer, LatencyBenchRequest, Method,
    Resource, ResourceValue, SensorConfig, SensorModel, SensorState,
};

/// Re-exports commonly used types.
pub mod prelude {
    pub use crate::config::{env_vars, GatewayConfig};
    pub use crate::error::{Error, Result};
    pub use crate::event::UpstreamEvent;
    pub use crate::types::{Command, InferenceLayer, Method, Resource, ResourceValue};
}
