//! Tests for basic handlers.

use axum::extract::State;
use sensorlink_api::handlers::basic::*;

#[tokio::test]
async fn test_health_handler() {
    let result = health_handler().await;
    let value = result.0;
    assert_eq!(value.get("status").unwrap().as_str().unwrap(), "ok");
    assert_eq!(value.get("service").unwrap().as_str().unwrap(), "sensorlink");
    assert!(value.get("version").is_some());
}

#[tokio::test]
async fn test_health_status_handler() {
    let server = crate::common::create_test_server();
    let result = health_status_handler(State(server.state)).await;
    assert_eq!(result.0.status, "healthy");
    assert_eq!(result.0.gateway_name, "gateway_1");
    assert!(result.0.latency_benchmark);
    assert!(!result.0.version.is_empty());
}
