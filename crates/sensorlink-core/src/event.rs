//! Events forwarded to the upstream gateway service.
//!
//! Every event is terminal: it is built from one inbound message (or one
//! HTTP request), posted once, and dropped.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{InferenceLayer, Method, Resource, SensorConfig, SensorState};

/// Decoded sensor reading in physical units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    #[serde(default)]
    pub uuid: String,
    /// `sequence_length` rows of `sample_size` channels.
    pub values: Vec<Vec<f64>>,
}

impl SensorReading {
    /// New reading with a fresh UUID.
    pub fn new(values: Vec<Vec<f64>>) -> Self {
        Self {
            uuid: uuid::Uuid::new_v4().to_string(),
            values,
        }
    }
}

/// Where and when inference for a reading happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceDescriptor {
    pub inference_layer: InferenceLayer,
    pub send_timestamp: i64,
    #[serde(default)]
    pub recv_timestamp: Option<i64>,
    #[serde(default)]
    pub prediction: Option<i64>,
}

impl InferenceDescriptor {
    /// Check the sensor-data contract: `prediction` and `recv_timestamp` are
    /// present exactly when inference already ran on the sensor.
    pub fn validate_for_sensor_data(&self) -> Result<()> {
        let on_sensor = self.inference_layer == InferenceLayer::Sensor;
        let has_prediction = self.prediction.is_some();
        let has_recv = self.recv_timestamp.is_some();
        if on_sensor != has_prediction || on_sensor != has_recv {
            return Err(Error::InvalidPayload(format!(
                "inference layer {:?} with prediction={} recv_timestamp={}",
                self.inference_layer, has_prediction, has_recv
            )));
        }
        Ok(())
    }

    /// Descriptor sent along a prediction request: the prediction has not
    /// been made yet.
    pub fn pending(&self) -> Self {
        Self {
            inference_layer: self.inference_layer,
            send_timestamp: self.send_timestamp,
            recv_timestamp: None,
            prediction: None,
        }
    }
}

/// Metadata attached to exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub gateway_name: String,
    pub sensor_name: String,
}

/// Metadata attached to command responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub sender: String,
    pub command_uuid: String,
}

/// Reading that still needs a prediction at the gateway or in the cloud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub low_battery: bool,
    pub reading: SensorReading,
    pub inference_descriptor: InferenceDescriptor,
}

/// Prediction made on the sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub reading_uuid: String,
    pub send_timestamp: i64,
    pub prediction: i64,
    pub inference_layer: InferenceLayer,
}

/// Time between a reading leaving the sensor and its prediction arriving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceLatencyBenchmark {
    pub reading_uuid: String,
    pub send_timestamp: i64,
    pub recv_timestamp: i64,
    pub inference_latency: i64,
}

impl InferenceLatencyBenchmark {
    /// Latency is `recv_timestamp - send_timestamp`. Timestamps come from the
    /// device, so a difference outside `i64` is an invalid payload.
    pub fn measure(
        reading_uuid: impl Into<String>,
        send_timestamp: i64,
        recv_timestamp: i64,
    ) -> Result<Self> {
        let inference_latency = recv_timestamp.checked_sub(send_timestamp).ok_or_else(|| {
            Error::InvalidPayload(format!(
                "inference latency out of range (send {}, recv {})",
                send_timestamp, recv_timestamp
            ))
        })?;
        Ok(Self {
            reading_uuid: reading_uuid.into(),
            send_timestamp,
            recv_timestamp,
            inference_latency,
        })
    }
}

/// Export wrapper sent upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEnvelope<T> {
    pub metadata: ExportMetadata,
    pub export_value: T,
}

/// Response wrapper sent upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope<T> {
    pub metadata: ResponseMetadata,
    #[serde(default)]
    pub resource_name: Option<String>,
    pub resource_value: T,
    #[serde(default = "default_response_method")]
    pub method: Method,
}

fn default_response_method() -> Method {
    Method::Get
}

impl<T> ResponseEnvelope<T> {
    pub fn new(resource: Resource, metadata: ResponseMetadata, resource_value: T) -> Self {
        Self {
            metadata,
            resource_name: Some(resource.as_str().to_string()),
            resource_value,
            method: Method::Get,
        }
    }
}

/// Canonical event forwarded to the upstream service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UpstreamEvent {
    SensorReadingExport(ExportEnvelope<SensorReading>),
    PredictionRequestExport(ExportEnvelope<PredictionRequest>),
    PredictionResultExport(ExportEnvelope<PredictionResult>),
    InferenceLatencyBenchmarkExport(ExportEnvelope<InferenceLatencyBenchmark>),
    SensorConfigResponse(ResponseEnvelope<SensorConfig>),
    InferenceLayerResponse(ResponseEnvelope<InferenceLayer>),
    SensorStateResponse(ResponseEnvelope<SensorState>),
}

/// Upstream endpoint of an event and the status it answers with on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamEndpoint {
    pub path: &'static str,
    pub expected_status: u16,
}

impl UpstreamEvent {
    pub fn endpoint(&self) -> UpstreamEndpoint {
        let (path, expected_status) = match self {
            UpstreamEvent::SensorReadingExport(_) => ("/export/sensor-reading", 201),
            UpstreamEvent::PredictionRequestExport(_) => ("/export/prediction-request", 202),
            UpstreamEvent::PredictionResultExport(_) => ("/export/prediction-result", 201),
            UpstreamEvent::InferenceLatencyBenchmarkExport(_) => {
                ("/export/inference-latency-benchmark", 201)
            }
            UpstreamEvent::SensorConfigResponse(_) => {
                ("/store/sensor/response/get/sensor-config", 202)
            }
            UpstreamEvent::InferenceLayerResponse(_) => {
                ("/store/sensor/response/get/inference-layer", 202)
            }
            UpstreamEvent::SensorStateResponse(_) => {
                ("/store/sensor/response/get/sensor-state", 202)
            }
        };
        UpstreamEndpoint {
            path,
            expected_status,
        }
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamEvent::SensorReadingExport(_) => "sensor-reading",
            UpstreamEvent::PredictionRequestExport(_) => "prediction-request",
            UpstreamEvent::PredictionResultExport(_) => "prediction-result",
            UpstreamEvent::InferenceLatencyBenchmarkExport(_) => "inference-latency-benchmark",
            UpstreamEvent::SensorConfigResponse(_) => "sensor-config-response",
            UpstreamEvent::InferenceLayerResponse(_) => "inference-layer-response",
            UpstreamEvent::SensorStateResponse(_) => "sensor-state-response",
        }
    }
}
