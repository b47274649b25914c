//! Tests for command response handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use sensorlink_api::handlers::responses::*;
use sensorlink_core::{
    InferenceLayer, Method, ResponseEnvelope, ResponseMetadata, SensorConfig, SensorState,
    UpstreamEvent,
};
use sensorlink_testing::{RecordingForwarder, RecordingPublisher};

use crate::common::{create_test_server, create_test_server_with};

fn envelope<T>(value: T) -> ResponseEnvelope<T> {
    ResponseEnvelope {
        metadata: ResponseMetadata {
            sender: "s1".into(),
            command_uuid: "c-42".into(),
        },
        resource_name: None,
        resource_value: value,
        method: Method::Get,
    }
}

#[tokio::test]
async fn test_sensor_state_response_fills_resource_name() {
    let server = create_test_server();
    let (status, Json(body)) =
        sensor_state_response(State(server.state), Json(envelope(SensorState::Idle)))
            .await
            .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.message, "GET Sensor State Response sent to Gateway API");

    let events = server.forwarder.events();
    assert_eq!(events.len(), 1);
    match &events[0] {
        UpstreamEvent::SensorStateResponse(forwarded) => {
            assert_eq!(forwarded.resource_name.as_deref(), Some("sensor-state"));
            assert_eq!(forwarded.metadata.command_uuid, "c-42");
            assert_eq!(forwarded.resource_value, SensorState::Idle);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_config_and_layer_responses() {
    let server = create_test_server();
    sensor_config_response(
        State(server.state.clone()),
        Json(envelope(SensorConfig {
            sleep_interval_ms: 1000,
        })),
    )
    .await
    .unwrap();
    inference_layer_response(
        State(server.state),
        Json(envelope(InferenceLayer::Gateway)),
    )
    .await
    .unwrap();

    assert_eq!(
        server.forwarder.kinds(),
        vec!["sensor-config-response", "inference-layer-response"]
    );
}

#[tokio::test]
async fn test_set_response_is_rejected() {
    let server = create_test_server();
    let mut body = envelope(SensorState::Locked);
    body.method = Method::Set;

    let err = sensor_state_response(State(server.state), Json(body))
        .await
        .unwrap_err();

    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert!(server.forwarder.events().is_empty());
}

#[tokio::test]
async fn test_response_upstream_failure() {
    let server = create_test_server_with(
        RecordingPublisher::default(),
        RecordingForwarder::failing_on("sensor-state-response", 500, "db down"),
        true,
    );
    let err = sensor_state_response(State(server.state), Json(envelope(SensorState::Working)))
        .await
        .unwrap_err();

    assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.details, Some(serde_json::Value::String("db down".into())));
}
