//! Sensor command handlers.
//!
//! Every handler fans the command out to `target.target_sensors` and answers
//! 202 with one correlation id per target. Sensors answer GET commands on
//! their response topic; SET commands get no response.

use axum::{extract::State, Json};
use sensorlink_core::{
    Command, InferenceLayer, LatencyBenchRequest, Resource, SensorConfig, SensorModel,
    SensorState,
};

use super::common::{send_command, HandlerResult};
use super::ServerState;
use crate::models::{CommandAccepted, GetCommandRequest, SetCommandRequest};

/// Set the lifecycle state of the target sensors.
pub async fn set_sensor_state(
    State(state): State<ServerState>,
    Json(req): Json<SetCommandRequest<SensorState>>,
) -> HandlerResult<CommandAccepted> {
    let command = Command::set(req.resource_value, req.target.target_sensors);
    send_command(&state, command, "SET Sensor State Command sent to devices").await
}

pub async fn get_sensor_state(
    State(state): State<ServerState>,
    Json(req): Json<GetCommandRequest>,
) -> HandlerResult<CommandAccepted> {
    let command = Command::get(Resource::SensorState, req.target.target_sensors);
    send_command(&state, command, "GET Sensor State Command sent to devices").await
}

/// Set the data collection interval of the target sensors.
pub async fn set_sensor_config(
    State(state): State<ServerState>,
    Json(req): Json<SetCommandRequest<SensorConfig>>,
) -> HandlerResult<CommandAccepted> {
    let command = Command::set(req.resource_value, req.target.target_sensors);
    send_command(&state, command, "SET Sensor Config Command sent to devices").await
}

pub async fn get_sensor_config(
    State(state): State<ServerState>,
    Json(req): Json<GetCommandRequest>,
) -> HandlerResult<CommandAccepted> {
    let command = Command::get(Resource::SensorConfig, req.target.target_sensors);
    send_command(&state, command, "GET Sensor Config Command sent to devices").await
}

/// Move inference to the sensor (0), the gateway (1) or the cloud (2).
pub async fn set_inference_layer(
    State(state): State<ServerState>,
    Json(req): Json<SetCommandRequest<InferenceLayer>>,
) -> HandlerResult<CommandAccepted> {
    let command = Command::set(req.resource_value, req.target.target_sensors);
    send_command(
        &state,
        command,
        "SET Sensor Inference Layer Command sent to devices",
    )
    .await
}

pub async fn get_inference_layer(
    State(state): State<ServerState>,
    Json(req): Json<GetCommandRequest>,
) -> HandlerResult<CommandAccepted> {
    let command = Command::get(Resource::InferenceLayer, req.target.target_sensors);
    send_command(
        &state,
        command,
        "GET Sensor Inference Layer Command sent to devices",
    )
    .await
}

/// Upload an inference model (gzip, base64) to the target sensors.
pub async fn set_sensor_model(
    State(state): State<ServerState>,
    Json(req): Json<SetCommandRequest<SensorModel>>,
) -> HandlerResult<CommandAccepted> {
    let command = Command::set(req.resource_value, req.target.target_sensors);
    send_command(&state, command, "Upload Sensor Model Command sent to devices").await
}

pub async fn get_sensor_model(
    State(state): State<ServerState>,
    Json(req): Json<GetCommandRequest>,
) -> HandlerResult<CommandAccepted> {
    let command = Command::get(Resource::SensorModel, req.target.target_sensors);
    send_command(&state, command, "GET Sensor Model Command sent to devices").await
}

/// Experimental: ask sensors to echo a timestamped latency probe.
///
/// Rejected with 400 when latency benchmarking is disabled.
pub async fn set_inf_latency_bench(
    State(state): State<ServerState>,
    Json(req): Json<SetCommandRequest<LatencyBenchRequest>>,
) -> HandlerResult<CommandAccepted> {
    let command = Command::set(req.resource_value, req.target.target_sensors);
    send_command(
        &state,
        command,
        "Inference Latency Benchmark Command sent to devices",
    )
    .await
}
