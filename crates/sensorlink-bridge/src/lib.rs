//! Device bus bridge for SensorLink.
//!
//! This crate connects the protocol types of `sensorlink-core` to the outside
//! world:
//! - MQTT publisher and subscriber connections
//! - Command fan-out to sensors
//! - Routing of inbound exports and responses to typed handlers
//! - Forwarding of canonical events to the upstream gateway service

pub mod dispatcher;
pub mod forwarder;
pub mod handlers;
pub mod mqtt;
pub mod router;
pub mod service;

pub use dispatcher::CommandDispatcher;
pub use forwarder::{Forward, GatewayForwarder};
pub use handlers::{ExportHandler, ExportKind, ResponseHandler};
pub use mqtt::{CommandPublisher, MqttPublisher, MqttSubscriber};
pub use router::InboundRouter;
pub use service::BridgeService;

pub use rumqttc::QoS;
