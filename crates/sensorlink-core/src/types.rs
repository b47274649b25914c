//! Command-side domain types.
//!
//! Resources and methods are closed enums: a topic or request naming anything
//! else fails to parse with a typed error instead of being silently ignored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Command method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    Set,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Set => "set",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "get" => Ok(Method::Get),
            "set" => Ok(Method::Set),
            other => Err(Error::UnknownMethod(other.to_string())),
        }
    }
}

/// A sensor property addressable by GET/SET.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resource {
    SensorState,
    SensorConfig,
    InferenceLayer,
    SensorModel,
    #[serde(rename = "inf-latency-bench")]
    InfLatencyBench,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::SensorState,
        Resource::SensorConfig,
        Resource::InferenceLayer,
        Resource::SensorModel,
        Resource::InfLatencyBench,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::SensorState => "sensor-state",
            Resource::SensorConfig => "sensor-config",
            Resource::InferenceLayer => "inference-layer",
            Resource::SensorModel => "sensor-model",
            Resource::InfLatencyBench => "inf-latency-bench",
        }
    }

    /// Whether sensors answer GET commands for this resource.
    pub fn is_gettable(&self) -> bool {
        matches!(
            self,
            Resource::SensorState | Resource::SensorConfig | Resource::InferenceLayer
        )
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Resource::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| Error::UnknownResource(s.to_string()))
    }
}

/// Sensor lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorState {
    /// Properties (config, model, ...) can still be updated.
    Initial,
    Unlocked,
    /// Properties are frozen.
    Locked,
    /// Collecting data and running inference.
    Working,
    Idle,
    /// Stopped after abnormal equipment behavior; needs a reset.
    Error,
}

/// Where the prediction for a reading is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum InferenceLayer {
    Sensor = 0,
    Gateway = 1,
    Cloud = 2,
}

impl From<InferenceLayer> for u8 {
    fn from(layer: InferenceLayer) -> Self {
        layer as u8
    }
}

impl TryFrom<u8> for InferenceLayer {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(InferenceLayer::Sensor),
            1 => Ok(InferenceLayer::Gateway),
            2 => Ok(InferenceLayer::Cloud),
            other => Err(format!("invalid inference layer {}", other)),
        }
    }
}

/// Sensor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Interval between two data collections.
    pub sleep_interval_ms: u64,
}

/// Inference model pushed to a sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorModel {
    /// Base64 of the GZIP-compressed model bytes.
    pub tf_model_b64: String,
    /// Size of the uncompressed model in bytes.
    pub tf_model_bytesize: u64,
}

/// Payload of the experimental latency benchmark command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyBenchRequest {
    pub reading_uuid: String,
    pub send_timestamp: i64,
}

/// Value carried by a SET command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResourceValue {
    SensorState(SensorState),
    SensorConfig(SensorConfig),
    InferenceLayer(InferenceLayer),
    SensorModel(SensorModel),
    InfLatencyBench(LatencyBenchRequest),
}

impl ResourceValue {
    pub fn resource(&self) -> Resource {
        match self {
            ResourceValue::SensorState(_) => Resource::SensorState,
            ResourceValue::SensorConfig(_) => Resource::SensorConfig,
            ResourceValue::InferenceLayer(_) => Resource::InferenceLayer,
            ResourceValue::SensorModel(_) => Resource::SensorModel,
            ResourceValue::InfLatencyBench(_) => Resource::InfLatencyBench,
        }
    }
}

impl From<SensorState> for ResourceValue {
    fn from(v: SensorState) -> Self {
        ResourceValue::SensorState(v)
    }
}

impl From<SensorConfig> for ResourceValue {
    fn from(v: SensorConfig) -> Self {
        ResourceValue::SensorConfig(v)
    }
}

impl From<InferenceLayer> for ResourceValue {
    fn from(v: InferenceLayer) -> Self {
        ResourceValue::InferenceLayer(v)
    }
}

impl From<SensorModel> for ResourceValue {
    fn from(v: SensorModel) -> Self {
        ResourceValue::SensorModel(v)
    }
}

impl From<LatencyBenchRequest> for ResourceValue {
    fn from(v: LatencyBenchRequest) -> Self {
        ResourceValue::InfLatencyBench(v)
    }
}

/// Sensors addressed by a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandTarget {
    pub target_sensors: Vec<String>,
}

/// A logical command, fanned out to every target sensor.
///
/// The resource of a SET command is always the resource of its value, so the
/// two cannot disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    method: Method,
    resource: Resource,
    target: Vec<String>,
    value: Option<ResourceValue>,
}

impl Command {
    /// GET command for a resource.
    pub fn get(resource: Resource, target: Vec<String>) -> Self {
        Self {
            method: Method::Get,
            resource,
            target,
            value: None,
        }
    }

    /// SET command carrying a new resource value.
    pub fn set(value: impl Into<ResourceValue>, target: Vec<String>) -> Self {
        let value = value.into();
        Self {
            method: Method::Set,
            resource: value.resource(),
            target,
            value: Some(value),
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn target(&self) -> &[String] {
        &self.target
    }

    pub fn value(&self) -> Option<&ResourceValue> {
        self.value.as_ref()
    }
}

/// One MQTT publish produced by fanning out a [`Command`].
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchedCommand {
    pub target: String,
    pub correlation_id: String,
    pub topic: String,
    pub payload: Vec<u8>,
}
