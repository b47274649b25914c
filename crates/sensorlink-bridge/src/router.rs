//! Inbound message routing.
//!
//! Every MQTT message is classified by the subscription filter it matches,
//! parsed, and handed to the export or response handler on its own task.
//! Handling never reports back to the MQTT event loop; failures end in the
//! log.

use std::sync::Arc;

use sensorlink_core::{
    decode_topic, topic_matches_filter, Error, GatewayConfig, ParsedTopic, Result, TopicFamily,
};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{error, warn};

use crate::forwarder::Forward;
use crate::handlers::{ExportHandler, ResponseHandler};

pub struct InboundRouter {
    export_filter: String,
    response_filter: String,
    exports: ExportHandler,
    responses: ResponseHandler,
    inflight: Option<Arc<Semaphore>>,
}

impl InboundRouter {
    pub fn new(config: &GatewayConfig, forwarder: Arc<dyn Forward>) -> Self {
        Self {
            export_filter: config.export_topic.clone(),
            response_filter: config.response_topic.clone(),
            exports: ExportHandler::new(
                forwarder.clone(),
                config.gateway_name.clone(),
                config.layout(),
            ),
            responses: ResponseHandler::new(forwarder),
            inflight: config.max_inflight.map(|n| Arc::new(Semaphore::new(n))),
        }
    }

    /// Route one message to its handler.
    pub async fn route(&self, topic: &str, payload: &[u8]) -> Result<()> {
        let family = if topic_matches_filter(topic, &self.export_filter) {
            TopicFamily::Export
        } else if topic_matches_filter(topic, &self.response_filter) {
            TopicFamily::Response
        } else {
            return Err(Error::UnknownTopic(topic.to_string()));
        };

        match decode_topic(topic, family)? {
            ParsedTopic::Export(export) => self.exports.handle(&export, payload).await,
            ParsedTopic::Response(response) => self.responses.handle(&response, payload).await,
            ParsedTopic::Command(_) => Err(Error::UnknownTopic(topic.to_string())),
        }
    }

    /// Handle a message on its own task.
    ///
    /// With a concurrency cap, the task waits for a permit before routing;
    /// the caller is never blocked.
    pub fn spawn(self: &Arc<Self>, topic: String, payload: Vec<u8>) -> JoinHandle<()> {
        let router = Arc::clone(self);
        tokio::spawn(async move {
            let _permit = match &router.inflight {
                Some(semaphore) => match Arc::clone(semaphore).acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(_) => return,
                },
                None => None,
            };

            if let Err(e) = router.route(&topic, &payload).await {
                if e.is_drop() {
                    warn!("Dropped message on {}: {}", topic, e);
                } else {
                    error!("Failed to handle message on {}: {}", topic, e);
                }
            }
        })
    }
}
