//! Gateway Forwarder Tests
//!
//! Runs the forwarder against a local upstream stub:
//! - Expected status per endpoint
//! - Upstream status and body preserved on failure
//! - Connection failures

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use sensorlink_bridge::{Forward, GatewayForwarder};
use sensorlink_core::{
    Error, ExportEnvelope, ExportMetadata, InferenceDescriptor, InferenceLayer, PredictionRequest,
    Resource, ResponseEnvelope, ResponseMetadata, SensorReading, SensorState, UpstreamEvent,
};
use serde_json::Value;

type Received = Arc<Mutex<Vec<(String, Value)>>>;

async fn record(received: Received, path: &str, body: Value) {
    received.lock().unwrap().push((path.to_string(), body));
}

/// Upstream stub answering like the gateway service, except that the
/// prediction-request endpoint rejects everything.
async fn spawn_upstream() -> (String, Received) {
    let received: Received = Arc::default();
    let app = Router::new()
        .route(
            "/api/v1/export/sensor-reading",
            post(|State(r): State<Received>, Json(body): Json<Value>| async move {
                record(r, "/export/sensor-reading", body).await;
                StatusCode::CREATED
            }),
        )
        .route(
            "/api/v1/export/prediction-request",
            post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "bad descriptor") }),
        )
        .route(
            "/api/v1/store/sensor/response/get/sensor-state",
            post(|State(r): State<Received>, Json(body): Json<Value>| async move {
                record(r, "/store/sensor/response/get/sensor-state", body).await;
                StatusCode::ACCEPTED
            }),
        )
        .with_state(received.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/api/v1", addr), received)
}

fn metadata() -> ExportMetadata {
    ExportMetadata {
        gateway_name: "gateway_1".into(),
        sensor_name: "s1".into(),
    }
}

#[tokio::test]
async fn test_forward_with_expected_status() {
    let (base_url, received) = spawn_upstream().await;
    let forwarder = GatewayForwarder::new(base_url, Duration::from_secs(5)).unwrap();

    let reading = SensorReading::new(vec![vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]]);
    forwarder
        .forward(&UpstreamEvent::SensorReadingExport(ExportEnvelope {
            metadata: metadata(),
            export_value: reading.clone(),
        }))
        .await
        .unwrap();

    forwarder
        .forward(&UpstreamEvent::SensorStateResponse(ResponseEnvelope::new(
            Resource::SensorState,
            ResponseMetadata {
                sender: "s1".into(),
                command_uuid: "c1".into(),
            },
            SensorState::Working,
        )))
        .await
        .unwrap();

    let received = received.lock().unwrap().clone();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].0, "/export/sensor-reading");
    assert_eq!(received[0].1["export_value"]["uuid"], reading.uuid.as_str());
    assert_eq!(received[0].1["metadata"]["sensor_name"], "s1");
    assert_eq!(received[1].1["resource_value"], "working");
    assert_eq!(received[1].1["method"], "get");
}

#[tokio::test]
async fn test_unexpected_status_keeps_status_and_body() {
    let (base_url, _) = spawn_upstream().await;
    let forwarder = GatewayForwarder::new(base_url, Duration::from_secs(5)).unwrap();

    let err = forwarder
        .forward(&UpstreamEvent::PredictionRequestExport(ExportEnvelope {
            metadata: metadata(),
            export_value: PredictionRequest {
                low_battery: true,
                reading: SensorReading::new(vec![]),
                inference_descriptor: InferenceDescriptor {
                    inference_layer: InferenceLayer::Gateway,
                    send_timestamp: 1,
                    recv_timestamp: None,
                    prediction: None,
                },
            },
        }))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        Error::Upstream {
            status: 422,
            body: "bad descriptor".into()
        }
    );
}

#[tokio::test]
async fn test_missing_endpoint_is_an_upstream_failure() {
    let (base_url, _) = spawn_upstream().await;
    let forwarder = GatewayForwarder::new(base_url, Duration::from_secs(5)).unwrap();

    let err = forwarder
        .forward(&UpstreamEvent::InferenceLayerResponse(ResponseEnvelope::new(
            Resource::InferenceLayer,
            ResponseMetadata {
                sender: "s1".into(),
                command_uuid: "c1".into(),
            },
            InferenceLayer::Cloud,
        )))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Upstream { status: 404, .. }));
}

#[tokio::test]
async fn test_unreachable_upstream_is_an_http_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let forwarder =
        GatewayForwarder::new(format!("http://{}", addr), Duration::from_secs(2)).unwrap();
    let err = forwarder
        .forward(&UpstreamEvent::SensorReadingExport(ExportEnvelope {
            metadata: metadata(),
            export_value: SensorReading::new(vec![]),
        }))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Http(_)));
}
