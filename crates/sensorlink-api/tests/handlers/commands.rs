//! Tests for command handlers.

use std::collections::HashSet;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use sensorlink_api::handlers::commands::*;
use sensorlink_api::models::{GetCommandRequest, SetCommandRequest};
use sensorlink_bridge::QoS;
use sensorlink_core::{InferenceLayer, LatencyBenchRequest, SensorConfig, SensorModel, SensorState};
use sensorlink_testing::{RecordingForwarder, RecordingPublisher};

use crate::common::{create_test_server, create_test_server_with, targets};

#[tokio::test]
async fn test_set_sensor_state_fans_out() {
    let server = create_test_server();
    let (status, Json(body)) = set_sensor_state(
        State(server.state),
        Json(SetCommandRequest {
            target: targets(&["s1", "s2", "s3"]),
            resource_value: SensorState::Working,
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body.message, "SET Sensor State Command sent to devices");
    assert_eq!(body.command_uuids.len(), 3);
    let distinct: HashSet<_> = body.command_uuids.iter().collect();
    assert_eq!(distinct.len(), 3);

    let published = server.publisher.published();
    for ((record, sensor), id) in published.iter().zip(["s1", "s2", "s3"]).zip(&body.command_uuids) {
        assert_eq!(record.topic, format!("command/{}/sensor-state/set/{}", sensor, id));
        assert_eq!(record.payload, br#"{"sensor-state":"working"}"#);
        assert_eq!(record.qos, QoS::AtLeastOnce);
        assert!(!record.retain);
    }
}

#[tokio::test]
async fn test_get_commands_publish_empty_payload() {
    let server = create_test_server();
    let (status, Json(body)) = get_sensor_config(
        State(server.state.clone()),
        Json(GetCommandRequest {
            target: targets(&["s1"]),
        }),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body.command_uuids.len(), 1);

    get_inference_layer(
        State(server.state.clone()),
        Json(GetCommandRequest {
            target: targets(&["s1"]),
        }),
    )
    .await
    .unwrap();
    get_sensor_model(
        State(server.state),
        Json(GetCommandRequest {
            target: targets(&["s1"]),
        }),
    )
    .await
    .unwrap();

    let published = server.publisher.published();
    assert_eq!(published.len(), 3);
    assert!(published[0].topic.starts_with("command/s1/sensor-config/get/"));
    assert!(published[1].topic.starts_with("command/s1/inference-layer/get/"));
    assert!(published[2].topic.starts_with("command/s1/sensor-model/get/"));
    assert!(published.iter().all(|p| p.payload == b"{}"));
}

#[tokio::test]
async fn test_set_payloads_per_resource() {
    let server = create_test_server();
    set_sensor_config(
        State(server.state.clone()),
        Json(SetCommandRequest {
            target: targets(&["s1"]),
            resource_value: SensorConfig {
                sleep_interval_ms: 2500,
            },
        }),
    )
    .await
    .unwrap();
    set_inference_layer(
        State(server.state.clone()),
        Json(SetCommandRequest {
            target: targets(&["s1"]),
            resource_value: InferenceLayer::Gateway,
        }),
    )
    .await
    .unwrap();
    let (_, Json(body)) = set_sensor_model(
        State(server.state),
        Json(SetCommandRequest {
            target: targets(&["s1"]),
            resource_value: SensorModel {
                tf_model_b64: "H4sIAAAAAAAA".into(),
                tf_model_bytesize: 4096,
            },
        }),
    )
    .await
    .unwrap();
    assert_eq!(body.message, "Upload Sensor Model Command sent to devices");

    let payloads: Vec<serde_json::Value> = server
        .publisher
        .published()
        .iter()
        .map(|p| serde_json::from_slice(&p.payload).unwrap())
        .collect();
    assert_eq!(payloads[0], serde_json::json!({"sensor-config": {"sleep_interval_ms": 2500}}));
    assert_eq!(payloads[1], serde_json::json!({"inference-layer": 1}));
    assert_eq!(payloads[2]["sensor-model"]["tf_model_bytesize"], 4096);
}

#[tokio::test]
async fn test_latency_bench_enabled() {
    let server = create_test_server();
    let (status, Json(body)) = set_inf_latency_bench(
        State(server.state),
        Json(SetCommandRequest {
            target: targets(&["s1", "s2"]),
            resource_value: LatencyBenchRequest {
                reading_uuid: "r-1".into(),
                send_timestamp: 1_700_000_000_000,
            },
        }),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body.command_uuids.len(), 2);
    assert!(server.publisher.published()[0]
        .topic
        .starts_with("command/s1/inf-latency-bench/set/"));
}

#[tokio::test]
async fn test_latency_bench_disabled_is_rejected() {
    let server = create_test_server_with(
        RecordingPublisher::default(),
        RecordingForwarder::default(),
        false,
    );
    let err = set_inf_latency_bench(
        State(server.state),
        Json(SetCommandRequest {
            target: targets(&["s1"]),
            resource_value: LatencyBenchRequest {
                reading_uuid: "r-1".into(),
                send_timestamp: 1,
            },
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert_eq!(err.message, "Latency Benchmarking is disabled");
    assert!(server.publisher.published().is_empty());
}

#[tokio::test]
async fn test_publish_failure_is_bad_gateway() {
    let server = create_test_server_with(
        RecordingPublisher::failing_on("s2"),
        RecordingForwarder::default(),
        true,
    );
    let err = get_sensor_state(
        State(server.state),
        Json(GetCommandRequest {
            target: targets(&["s1", "s2", "s3"]),
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status, StatusCode::BAD_GATEWAY);
    assert_eq!(err.code, "PUBLISH_FAILED");
    assert_eq!(server.publisher.published().len(), 1);
}

#[tokio::test]
async fn test_invalid_target_name_is_bad_request() {
    let server = create_test_server();
    let err = get_sensor_state(
        State(server.state),
        Json(GetCommandRequest {
            target: targets(&["line-1/s1"]),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert!(server.publisher.published().is_empty());
}
