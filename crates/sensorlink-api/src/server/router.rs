//! Application router configuration.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use super::state::ServerState;

/// Largest accepted request body. Sensor models travel inline as base64.
pub const MAX_REQUEST_BODY_SIZE: usize = 16 * 1024 * 1024;

/// Create the application router with a specific state.
pub fn create_router_with_state(state: ServerState) -> Router {
    use crate::handlers::{basic, commands, exports, responses};

    let commands = Router::new()
        .route("/set/sensor-state", post(commands::set_sensor_state))
        .route("/get/sensor-state", post(commands::get_sensor_state))
        .route("/set/sensor-config", post(commands::set_sensor_config))
        .route("/get/sensor-config", post(commands::get_sensor_config))
        .route("/set/inference-layer", post(commands::set_inference_layer))
        .route("/get/inference-layer", post(commands::get_inference_layer))
        .route("/set/sensor-model", post(commands::set_sensor_model))
        .route("/get/sensor-model", post(commands::get_sensor_model))
        .route("/set/inf-latency-bench", post(commands::set_inf_latency_bench));

    let exports = Router::new()
        .route("/sensor-reading", post(exports::export_sensor_reading))
        .route("/prediction-request", post(exports::export_prediction_request))
        .route("/prediction-result", post(exports::export_prediction_result))
        .route(
            "/inference-latency-benchmark",
            post(exports::export_inference_latency_benchmark),
        );

    let responses = Router::new()
        .route("/sensor-state", post(responses::sensor_state_response))
        .route("/sensor-config", post(responses::sensor_config_response))
        .route("/inference-layer", post(responses::inference_layer_response));

    let api_v1 = Router::new()
        .nest("/sensor/command", commands)
        .nest("/export", exports)
        .nest("/sensor/response/get", responses);

    Router::new()
        .route("/api/health", get(basic::health_handler))
        .route("/api/health/status", get(basic::health_status_handler))
        .nest("/api/v1", api_v1)
        .layer(DefaultBodyLimit::disable())
        .layer(tower_http::limit::RequestBodyLimitLayer::new(
            MAX_REQUEST_BODY_SIZE,
        ))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .with_state(state)
}
