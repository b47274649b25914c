//! Router tests: requests go through routing, extraction and error rendering.

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use sensorlink_api::create_router_with_state;
use sensorlink_testing::{RecordingForwarder, RecordingPublisher};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{create_test_server, create_test_server_with};

async fn post_json(router: axum::Router, uri: &str, body: Value) -> Response {
    router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_route() {
    let server = create_test_server();
    let response = create_router_with_state(server.state)
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

// ============================================================================
// Commands
// ============================================================================

#[tokio::test]
async fn test_set_sensor_state_route() {
    let server = create_test_server();
    let response = post_json(
        create_router_with_state(server.state),
        "/api/v1/sensor/command/set/sensor-state",
        json!({
            "target": {"target_sensors": ["s1", "s2"]},
            "resource_value": "locked"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = body_json(response).await;
    assert_eq!(body["command_uuids"].as_array().unwrap().len(), 2);
    assert_eq!(server.publisher.published().len(), 2);
}

#[tokio::test]
async fn test_unknown_sensor_state_is_rejected_before_publishing() {
    let server = create_test_server();
    let response = post_json(
        create_router_with_state(server.state),
        "/api/v1/sensor/command/set/sensor-state",
        json!({
            "target": {"target_sensors": ["s1"]},
            "resource_value": "sleeping"
        }),
    )
    .await;

    assert!(response.status().is_client_error());
    assert!(server.publisher.published().is_empty());
}

#[tokio::test]
async fn test_disabled_latency_bench_renders_error_body() {
    let server = create_test_server_with(
        RecordingPublisher::default(),
        RecordingForwarder::default(),
        false,
    );
    let response = post_json(
        create_router_with_state(server.state),
        "/api/v1/sensor/command/set/inf-latency-bench",
        json!({
            "target": {"target_sensors": ["s1"]},
            "resource_value": {"reading_uuid": "r-1", "send_timestamp": 1}
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "FEATURE_DISABLED");
    assert_eq!(body["error"]["message"], "Latency Benchmarking is disabled");
}

// ============================================================================
// Exports and responses
// ============================================================================

#[tokio::test]
async fn test_export_upstream_error_is_passed_through() {
    let server = create_test_server_with(
        RecordingPublisher::default(),
        RecordingForwarder::failing_on("prediction-result", 409, r#"{"detail":"duplicate"}"#),
        true,
    );
    let response = post_json(
        create_router_with_state(server.state),
        "/api/v1/export/prediction-result",
        json!({
            "metadata": {"gateway_name": "gateway_1", "sensor_name": "s1"},
            "export_value": {
                "reading_uuid": "r-1",
                "send_timestamp": 1000,
                "prediction": 1,
                "inference_layer": 0
            }
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"]["details"]["detail"], "duplicate");
}

#[tokio::test]
async fn test_response_route_answers_ok() {
    let server = create_test_server();
    let response = post_json(
        create_router_with_state(server.state),
        "/api/v1/sensor/response/get/inference-layer",
        json!({
            "metadata": {"sender": "s1", "command_uuid": "c-1"},
            "resource_value": 2
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(server.forwarder.kinds(), vec!["inference-layer-response"]);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let server = create_test_server();
    let response = post_json(
        create_router_with_state(server.state),
        "/api/v1/sensor/command/set/firmware",
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
