//! Export messages: `export/<sensor>/<export_name>`.

use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;
use sensorlink_core::topic::ExportTopic;
use sensorlink_core::{
    decode_sensor_reading, Error, ExportEnvelope, ExportMetadata, InferenceDescriptor,
    InferenceLatencyBenchmark, InferenceLayer, PredictionRequest, PredictionResult, Result,
    SensorReadingLayout, UpstreamEvent,
};
use tracing::info;

use super::forward_all;
use crate::forwarder::Forward;

/// Known export names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    SensorData,
    InfLatencyBench,
}

impl ExportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::SensorData => "sensor-data",
            ExportKind::InfLatencyBench => "inf-latency-bench",
        }
    }
}

impl FromStr for ExportKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sensor-data" => Ok(ExportKind::SensorData),
            "inf-latency-bench" => Ok(ExportKind::InfLatencyBench),
            other => Err(Error::UnknownExportName(other.to_string())),
        }
    }
}

/// Payload of a `sensor-data` export.
#[derive(Debug, Clone, Deserialize)]
pub struct SensorDataMessage {
    pub low_battery: bool,
    /// Base64 of the zlib-compressed sample grid.
    #[serde(alias = "reading")]
    pub sensor_reading: String,
    pub inference_descriptor: InferenceDescriptor,
}

/// Payload of an `inf-latency-bench` export. Already in physical units.
#[derive(Debug, Clone, Deserialize)]
pub struct LatencyBenchMessage {
    pub reading_uuid: String,
    pub send_timestamp: i64,
    pub recv_timestamp: i64,
    pub inference_latency: i64,
}

pub struct ExportHandler {
    forwarder: Arc<dyn Forward>,
    gateway_name: String,
    layout: SensorReadingLayout,
}

impl ExportHandler {
    pub fn new(
        forwarder: Arc<dyn Forward>,
        gateway_name: impl Into<String>,
        layout: SensorReadingLayout,
    ) -> Self {
        Self {
            forwarder,
            gateway_name: gateway_name.into(),
            layout,
        }
    }

    pub async fn handle(&self, topic: &ExportTopic, payload: &[u8]) -> Result<()> {
        let kind: ExportKind = topic.export_name.parse()?;
        info!("Export from {} for {}", topic.sensor, kind.as_str());

        let metadata = ExportMetadata {
            gateway_name: self.gateway_name.clone(),
            sensor_name: topic.sensor.clone(),
        };
        let events = match kind {
            ExportKind::SensorData => self.sensor_data_events(metadata, parse(payload)?)?,
            ExportKind::InfLatencyBench => {
                let message: LatencyBenchMessage = parse(payload)?;
                vec![UpstreamEvent::InferenceLatencyBenchmarkExport(ExportEnvelope {
                    metadata,
                    export_value: InferenceLatencyBenchmark {
                        reading_uuid: message.reading_uuid,
                        send_timestamp: message.send_timestamp,
                        recv_timestamp: message.recv_timestamp,
                        inference_latency: message.inference_latency,
                    },
                })]
            }
        };

        forward_all(self.forwarder.as_ref(), &events).await
    }

    /// Events produced by one sensor-data export.
    ///
    /// The reading is always exported. A prediction made on the sensor adds
    /// the prediction result and its latency; otherwise a prediction request
    /// is exported for the gateway or the cloud.
    pub fn sensor_data_events(
        &self,
        metadata: ExportMetadata,
        message: SensorDataMessage,
    ) -> Result<Vec<UpstreamEvent>> {
        let descriptor = message.inference_descriptor;
        descriptor.validate_for_sensor_data()?;
        let reading = decode_sensor_reading(&message.sensor_reading, self.layout)?;

        let mut events = vec![UpstreamEvent::SensorReadingExport(ExportEnvelope {
            metadata: metadata.clone(),
            export_value: reading.clone(),
        })];

        match (descriptor.inference_layer, descriptor.prediction, descriptor.recv_timestamp) {
            (InferenceLayer::Sensor, Some(prediction), Some(recv_timestamp)) => {
                events.push(UpstreamEvent::PredictionResultExport(ExportEnvelope {
                    metadata: metadata.clone(),
                    export_value: PredictionResult {
                        reading_uuid: reading.uuid.clone(),
                        send_timestamp: descriptor.send_timestamp,
                        prediction,
                        inference_layer: InferenceLayer::Sensor,
                    },
                }));
                events.push(UpstreamEvent::InferenceLatencyBenchmarkExport(ExportEnvelope {
                    metadata,
                    export_value: InferenceLatencyBenchmark::measure(
                        reading.uuid,
                        descriptor.send_timestamp,
                        recv_timestamp,
                    )?,
                }));
            }
            (InferenceLayer::Gateway | InferenceLayer::Cloud, _, _) => {
                events.push(UpstreamEvent::PredictionRequestExport(ExportEnvelope {
                    metadata,
                    export_value: PredictionRequest {
                        low_battery: message.low_battery,
                        reading,
                        inference_descriptor: descriptor.pending(),
                    },
                }));
            }
            (InferenceLayer::Sensor, _, _) => {
                return Err(Error::InvalidPayload(
                    "sensor inference without prediction".to_string(),
                ));
            }
        }
        Ok(events)
    }
}

fn parse<'a, T: Deserialize<'a>>(payload: &'a [u8]) -> Result<T> {
    serde_json::from_slice(payload).map_err(|e| Error::InvalidPayload(e.to_string()))
}
