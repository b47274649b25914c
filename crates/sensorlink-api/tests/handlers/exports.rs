//! Tests for export relay handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use sensorlink_api::handlers::exports::*;
use sensorlink_testing::{RecordingForwarder, RecordingPublisher};
use sensorlink_core::{
    ExportEnvelope, ExportMetadata, InferenceDescriptor, InferenceLatencyBenchmark,
    InferenceLayer, PredictionRequest, PredictionResult, SensorReading, UpstreamEvent,
};

use crate::common::{create_test_server, create_test_server_with};

fn metadata() -> ExportMetadata {
    ExportMetadata {
        gateway_name: "gateway_1".into(),
        sensor_name: "s1".into(),
    }
}

#[tokio::test]
async fn test_export_sensor_reading() {
    let server = create_test_server();
    let reading = SensorReading::new(vec![vec![0.5, 1.0], vec![1.5, 2.0]]);
    let envelope = ExportEnvelope {
        metadata: metadata(),
        export_value: reading,
    };

    let (status, Json(body)) = export_sensor_reading(State(server.state), Json(envelope.clone()))
        .await
        .unwrap();

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body.message, "Sensor Reading Export sent to Gateway API");
    assert_eq!(
        server.forwarder.events(),
        vec![UpstreamEvent::SensorReadingExport(envelope)]
    );
}

#[tokio::test]
async fn test_export_prediction_request_and_result() {
    let server = create_test_server();
    export_prediction_request(
        State(server.state.clone()),
        Json(ExportEnvelope {
            metadata: metadata(),
            export_value: PredictionRequest {
                low_battery: true,
                reading: SensorReading::new(vec![vec![0.0]]),
                inference_descriptor: InferenceDescriptor {
                    inference_layer: InferenceLayer::Cloud,
                    send_timestamp: 1000,
                    recv_timestamp: None,
                    prediction: None,
                },
            },
        }),
    )
    .await
    .unwrap();
    export_prediction_result(
        State(server.state.clone()),
        Json(ExportEnvelope {
            metadata: metadata(),
            export_value: PredictionResult {
                reading_uuid: "r-1".into(),
                send_timestamp: 1000,
                prediction: 2,
                inference_layer: InferenceLayer::Sensor,
            },
        }),
    )
    .await
    .unwrap();
    export_inference_latency_benchmark(
        State(server.state),
        Json(ExportEnvelope {
            metadata: metadata(),
            export_value: InferenceLatencyBenchmark::measure("r-1", 1000, 1250).unwrap(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(
        server.forwarder.kinds(),
        vec![
            "prediction-request",
            "prediction-result",
            "inference-latency-benchmark"
        ]
    );
}

#[tokio::test]
async fn test_export_upstream_rejection_keeps_status_and_body() {
    let server = create_test_server_with(
        RecordingPublisher::default(),
        RecordingForwarder::failing_on("sensor-reading", 422, r#"{"detail":"bad shape"}"#),
        true,
    );
    let err = export_sensor_reading(
        State(server.state),
        Json(ExportEnvelope {
            metadata: metadata(),
            export_value: SensorReading::new(vec![]),
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err.code, "UPSTREAM_ERROR");
    assert_eq!(err.details, Some(serde_json::json!({"detail": "bad shape"})));
}

#[tokio::test]
async fn test_export_upstream_success_status_mismatch_is_bad_gateway() {
    let server = create_test_server_with(
        RecordingPublisher::default(),
        RecordingForwarder::failing_on("prediction-result", 200, "ok"),
        true,
    );
    let err = export_prediction_result(
        State(server.state),
        Json(ExportEnvelope {
            metadata: metadata(),
            export_value: PredictionResult {
                reading_uuid: "r-1".into(),
                send_timestamp: 1,
                prediction: 0,
                inference_layer: InferenceLayer::Sensor,
            },
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status, StatusCode::BAD_GATEWAY);
    assert_eq!(err.details, Some(serde_json::Value::String("ok".into())));
}
