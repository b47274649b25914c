//! Export handlers: relay already-canonical exports to the gateway API.

use axum::http::StatusCode;
use axum::{extract::State, Json};
use sensorlink_core::{
    ExportEnvelope, InferenceLatencyBenchmark, PredictionRequest, PredictionResult,
    SensorReading, UpstreamEvent,
};

use super::common::{forward_event, HandlerResult};
use super::ServerState;
use crate::models::MessageResponse;

pub async fn export_sensor_reading(
    State(state): State<ServerState>,
    Json(export): Json<ExportEnvelope<SensorReading>>,
) -> HandlerResult<MessageResponse> {
    forward_event(
        &state,
        UpstreamEvent::SensorReadingExport(export),
        StatusCode::ACCEPTED,
        "Sensor Reading Export sent to Gateway API",
    )
    .await
}

pub async fn export_prediction_request(
    State(state): State<ServerState>,
    Json(export): Json<ExportEnvelope<PredictionRequest>>,
) -> HandlerResult<MessageResponse> {
    forward_event(
        &state,
        UpstreamEvent::PredictionRequestExport(export),
        StatusCode::ACCEPTED,
        "Prediction Request Export sent to Gateway API",
    )
    .await
}

pub async fn export_prediction_result(
    State(state): State<ServerState>,
    Json(export): Json<ExportEnvelope<PredictionResult>>,
) -> HandlerResult<MessageResponse> {
    forward_event(
        &state,
        UpstreamEvent::PredictionResultExport(export),
        StatusCode::ACCEPTED,
        "Prediction Result Export sent to Gateway API",
    )
    .await
}

pub async fn export_inference_latency_benchmark(
    State(state): State<ServerState>,
    Json(export): Json<ExportEnvelope<InferenceLatencyBenchmark>>,
) -> HandlerResult<MessageResponse> {
    forward_event(
        &state,
        UpstreamEvent::InferenceLatencyBenchmarkExport(export),
        StatusCode::ACCEPTED,
        "Inference Latency Benchmark Export sent to Gateway API",
    )
    .await
}
