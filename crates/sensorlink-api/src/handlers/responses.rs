//! Command response handlers: store GET responses through the gateway API.

use axum::http::StatusCode;
use axum::{extract::State, Json};
use sensorlink_core::{
    InferenceLayer, Method, Resource, ResponseEnvelope, SensorConfig, SensorState, UpstreamEvent,
};

use super::common::{forward_event, HandlerResult};
use super::ServerState;
use crate::models::{ErrorResponse, MessageResponse};

/// Check the method and fill in the resource name.
fn normalize<T>(
    resource: Resource,
    mut envelope: ResponseEnvelope<T>,
) -> Result<ResponseEnvelope<T>, ErrorResponse> {
    if envelope.method != Method::Get {
        return Err(ErrorResponse::bad_request(format!(
            "Only GET responses are stored, got {}",
            envelope.method
        )));
    }
    envelope.resource_name = Some(resource.as_str().to_string());
    Ok(envelope)
}

pub async fn sensor_state_response(
    State(state): State<ServerState>,
    Json(envelope): Json<ResponseEnvelope<SensorState>>,
) -> HandlerResult<MessageResponse> {
    let envelope = normalize(Resource::SensorState, envelope)?;
    forward_event(
        &state,
        UpstreamEvent::SensorStateResponse(envelope),
        StatusCode::OK,
        "GET Sensor State Response sent to Gateway API",
    )
    .await
}

pub async fn sensor_config_response(
    State(state): State<ServerState>,
    Json(envelope): Json<ResponseEnvelope<SensorConfig>>,
) -> HandlerResult<MessageResponse> {
    let envelope = normalize(Resource::SensorConfig, envelope)?;
    forward_event(
        &state,
        UpstreamEvent::SensorConfigResponse(envelope),
        StatusCode::OK,
        "GET Sensor Config Response sent to Gateway API",
    )
    .await
}

pub async fn inference_layer_response(
    State(state): State<ServerState>,
    Json(envelope): Json<ResponseEnvelope<InferenceLayer>>,
) -> HandlerResult<MessageResponse> {
    let envelope = normalize(Resource::InferenceLayer, envelope)?;
    forward_event(
        &state,
        UpstreamEvent::InferenceLayerResponse(envelope),
        StatusCode::OK,
        "GET Sensor Inference Layer Response sent to Gateway API",
    )
    .await
}
