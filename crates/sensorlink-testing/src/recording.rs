//! In-memory publisher and forwarder.

use std::sync::Mutex;

use async_trait::async_trait;
use sensorlink_bridge::{CommandPublisher, Forward, QoS};
use sensorlink_core::{Error, Result, UpstreamEvent};

/// One recorded publish.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishRecord {
    pub topic: String,
    pub payload: Vec<u8>,
    pub qos: QoS,
    pub retain: bool,
}

/// Publisher that keeps every publish in memory.
#[derive(Default)]
pub struct RecordingPublisher {
    records: Mutex<Vec<PublishRecord>>,
    fail_target: Option<String>,
}

impl RecordingPublisher {
    /// Publisher that fails any publish addressed to `target`.
    pub fn failing_on(target: impl Into<String>) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail_target: Some(target.into()),
        }
    }

    pub fn published(&self) -> Vec<PublishRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CommandPublisher for RecordingPublisher {
    async fn publish(&self, topic: &str, payload: Vec<u8>, qos: QoS, retain: bool) -> Result<()> {
        if let Some(target) = &self.fail_target {
            if topic.split('/').nth(1) == Some(target.as_str()) {
                return Err(Error::Publish(format!("{}: connection closed", topic)));
            }
        }
        if let Ok(mut records) = self.records.lock() {
            records.push(PublishRecord {
                topic: topic.to_string(),
                payload,
                qos,
                retain,
            });
        }
        Ok(())
    }
}

/// Forwarder that keeps every event in memory.
#[derive(Default)]
pub struct RecordingForwarder {
    events: Mutex<Vec<UpstreamEvent>>,
    failure: Option<(String, u16, String)>,
}

impl RecordingForwarder {
    /// Forwarder that answers events of `kind` with `status` and `body`.
    ///
    /// Failing events are still recorded as attempted.
    pub fn failing_on(kind: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            failure: Some((kind.into(), status, body.into())),
        }
    }

    pub fn events(&self) -> Vec<UpstreamEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Kinds of the forwarded events, in order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events().iter().map(UpstreamEvent::kind).collect()
    }
}

#[async_trait]
impl Forward for RecordingForwarder {
    async fn forward(&self, event: &UpstreamEvent) -> Result<()> {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
        match &self.failure {
            Some((kind, status, body)) if kind == event.kind() => Err(Error::Upstream {
                status: *status,
                body: body.clone(),
            }),
            _ => Ok(()),
        }
    }
}
