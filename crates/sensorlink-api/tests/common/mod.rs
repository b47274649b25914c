//! Common test utilities for API tests.

#![allow(dead_code)]

use std::sync::Arc;

use sensorlink_api::ServerState;
use sensorlink_bridge::{CommandDispatcher, Forward};
use sensorlink_core::GatewayConfig;
use sensorlink_testing::{RecordingForwarder, RecordingPublisher};

/// Server state wired to in-memory recorders instead of a broker and an
/// upstream service.
pub struct TestServer {
    pub state: ServerState,
    pub publisher: Arc<RecordingPublisher>,
    pub forwarder: Arc<RecordingForwarder>,
}

pub fn create_test_server() -> TestServer {
    build(RecordingPublisher::default(), RecordingForwarder::default(), true)
}

pub fn create_test_server_with(
    publisher: RecordingPublisher,
    forwarder: RecordingForwarder,
    latency_benchmark: bool,
) -> TestServer {
    build(publisher, forwarder, latency_benchmark)
}

fn build(
    publisher: RecordingPublisher,
    forwarder: RecordingForwarder,
    latency_benchmark: bool,
) -> TestServer {
    let publisher = Arc::new(publisher);
    let forwarder = Arc::new(forwarder);
    let config = GatewayConfig {
        latency_benchmark,
        ..GatewayConfig::default()
    };
    let dispatcher = Arc::new(CommandDispatcher::new(publisher.clone(), latency_benchmark));
    let state = ServerState::new(dispatcher, forwarder.clone() as Arc<dyn Forward>, config);
    TestServer {
        state,
        publisher,
        forwarder,
    }
}

pub fn targets(names: &[&str]) -> sensorlink_core::CommandTarget {
    sensorlink_core::CommandTarget {
        target_sensors: names.iter().map(|s| s.to_string()).collect(),
    }
}
