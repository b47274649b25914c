//! Bridge service - owns the broker connections and the shared handles.
//!
//! The service is the single owner of both MQTT clients. The dispatcher and
//! the router receive them as explicit values; nothing is global.

use std::sync::Arc;

use sensorlink_core::{GatewayConfig, Result};
use tokio::task::JoinHandle;
use tracing::info;

use crate::dispatcher::CommandDispatcher;
use crate::forwarder::{Forward, GatewayForwarder};
use crate::mqtt::{MqttPublisher, MqttSubscriber};
use crate::router::InboundRouter;

pub struct BridgeService {
    dispatcher: Arc<CommandDispatcher>,
    forwarder: Arc<dyn Forward>,
    router: Arc<InboundRouter>,
    publisher: MqttPublisher,
    subscriber: MqttSubscriber,
    tasks: Vec<JoinHandle<()>>,
}

impl BridgeService {
    /// Connect both clients and start their event loops.
    pub fn start(config: &GatewayConfig) -> Result<Self> {
        let forwarder: Arc<dyn Forward> = Arc::new(GatewayForwarder::from_config(config)?);
        Ok(Self::start_with_forwarder(config, forwarder))
    }

    pub fn start_with_forwarder(config: &GatewayConfig, forwarder: Arc<dyn Forward>) -> Self {
        let router = Arc::new(InboundRouter::new(config, forwarder.clone()));

        let (publisher, publisher_task) = MqttPublisher::connect(config);
        let (subscriber, subscriber_task) = MqttSubscriber::connect(config, router.clone());

        let dispatcher = Arc::new(CommandDispatcher::new(
            Arc::new(publisher.clone()),
            config.latency_benchmark,
        ));

        info!(
            "Bridge started (gateway {}, upstream {}, latency benchmark {})",
            config.gateway_name,
            config.gateway_api_url,
            if config.latency_benchmark { "on" } else { "off" }
        );

        Self {
            dispatcher,
            forwarder,
            router,
            publisher,
            subscriber,
            tasks: vec![publisher_task, subscriber_task],
        }
    }

    pub fn dispatcher(&self) -> Arc<CommandDispatcher> {
        self.dispatcher.clone()
    }

    pub fn forwarder(&self) -> Arc<dyn Forward> {
        self.forwarder.clone()
    }

    pub fn router(&self) -> Arc<InboundRouter> {
        self.router.clone()
    }

    /// Disconnect from the broker and stop the event loops.
    pub async fn shutdown(self) {
        self.subscriber.disconnect().await;
        self.publisher.disconnect().await;
        for task in self.tasks {
            task.abort();
        }
        info!("Bridge stopped");
    }
}
