//! Command responses: `response/<sensor>/<resource>/<method>/<correlation_id>`.
//!
//! Sensors only answer GET commands. The payload wraps the value in a field
//! named after the resource, e.g. `{"sensor-state": "idle"}`.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use sensorlink_core::topic::AddressedTopic;
use sensorlink_core::{
    Error, Method, Resource, ResponseEnvelope, ResponseMetadata, Result, UpstreamEvent,
};
use tracing::info;

use super::forward_all;
use crate::forwarder::Forward;

pub struct ResponseHandler {
    forwarder: Arc<dyn Forward>,
}

impl ResponseHandler {
    pub fn new(forwarder: Arc<dyn Forward>) -> Self {
        Self { forwarder }
    }

    pub async fn handle(&self, topic: &AddressedTopic, payload: &[u8]) -> Result<()> {
        let event = Self::to_event(topic, payload)?;
        info!(
            "Response from {} for {} ({})",
            topic.sensor, topic.resource, topic.correlation_id
        );
        forward_all(self.forwarder.as_ref(), std::slice::from_ref(&event)).await
    }

    /// Canonical event for a response, or why it is dropped.
    pub fn to_event(topic: &AddressedTopic, payload: &[u8]) -> Result<UpstreamEvent> {
        let method: Method = topic.method.parse()?;
        if method != Method::Get {
            return Err(Error::UnknownMethod(format!(
                "{} (only get responses are handled)",
                method
            )));
        }
        let resource: Resource = topic.resource.parse()?;

        let metadata = ResponseMetadata {
            sender: topic.sensor.clone(),
            command_uuid: topic.correlation_id.clone(),
        };
        let event = match resource {
            Resource::SensorConfig => UpstreamEvent::SensorConfigResponse(ResponseEnvelope::new(
                resource,
                metadata,
                unwrap_value(resource, payload)?,
            )),
            Resource::SensorState => UpstreamEvent::SensorStateResponse(ResponseEnvelope::new(
                resource,
                metadata,
                unwrap_value(resource, payload)?,
            )),
            Resource::InferenceLayer => UpstreamEvent::InferenceLayerResponse(
                ResponseEnvelope::new(resource, metadata, unwrap_value(resource, payload)?),
            ),
            Resource::SensorModel | Resource::InfLatencyBench => {
                return Err(Error::UnknownResource(format!(
                    "{} (not gettable)",
                    resource
                )));
            }
        };
        Ok(event)
    }
}

/// Extract `payload[<resource>]` as `T`.
fn unwrap_value<T: DeserializeOwned>(resource: Resource, payload: &[u8]) -> Result<T> {
    let mut body: Value =
        serde_json::from_slice(payload).map_err(|e| Error::InvalidPayload(e.to_string()))?;
    let value = body
        .get_mut(resource.as_str())
        .map(Value::take)
        .ok_or_else(|| Error::InvalidPayload(format!("missing '{}' field", resource)))?;
    serde_json::from_value(value)
        .map_err(|e| Error::InvalidPayload(format!("{}: {}", resource, e)))
}
