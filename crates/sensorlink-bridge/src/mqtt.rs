//! MQTT client lifecycle.
//!
//! Two broker connections are used: a persistent-session publisher for
//! commands and a clean-session subscriber for exports and responses. Each
//! owns its `rumqttc` event loop, driven by a spawned task.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use sensorlink_core::{Error, GatewayConfig, Result};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::router::InboundRouter;

/// Capacity of the request channel between a client handle and its event loop.
const REQUEST_CHANNEL_CAPACITY: usize = 10;
/// Consecutive poll errors after which the failure is reported as an error.
const MAX_POLL_ERRORS: u32 = 5;
/// Largest inbound packet; sensor readings are a few kilobytes.
const MAX_PACKET_SIZE: usize = 10 * 1024 * 1024;

/// Publishes serialized commands on the device bus.
#[async_trait]
pub trait CommandPublisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>, qos: QoS, retain: bool) -> Result<()>;
}

fn mqtt_options(client_id: &str, config: &GatewayConfig, clean_session: bool) -> MqttOptions {
    let mut options = MqttOptions::new(client_id, &config.broker_host, config.broker_port);
    options.set_keep_alive(Duration::from_secs(config.mqtt_keep_alive_secs));
    options.set_clean_session(clean_session);
    options.set_max_packet_size(MAX_PACKET_SIZE, MAX_PACKET_SIZE);
    options
}

/// Command publisher backed by a broker connection.
#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
}

impl MqttPublisher {
    /// Create the publisher connection and start its event loop.
    pub fn connect(config: &GatewayConfig) -> (Self, JoinHandle<()>) {
        let options = mqtt_options(&config.publisher_client_id, config, false);
        let (client, eventloop) = AsyncClient::new(options, REQUEST_CHANNEL_CAPACITY);
        let label = config.publisher_client_id.clone();
        let handle = tokio::spawn(drive(eventloop, label, |_| {}));
        info!(
            "MQTT publisher {} connecting to {}:{}",
            config.publisher_client_id, config.broker_host, config.broker_port
        );
        (Self { client }, handle)
    }

    /// Send a DISCONNECT to the broker.
    pub async fn disconnect(&self) {
        if let Err(e) = self.client.disconnect().await {
            debug!("MQTT publisher disconnect: {}", e);
        }
    }
}

#[async_trait]
impl CommandPublisher for MqttPublisher {
    async fn publish(&self, topic: &str, payload: Vec<u8>, qos: QoS, retain: bool) -> Result<()> {
        self.client
            .publish(topic, qos, retain, payload)
            .await
            .map_err(|e| Error::Publish(format!("{}: {}", topic, e)))
    }
}

/// Subscriber connection feeding the inbound router.
pub struct MqttSubscriber {
    client: AsyncClient,
}

impl MqttSubscriber {
    /// Create the subscriber connection and start its event loop.
    ///
    /// The export and response filters are (re)subscribed on every ConnAck,
    /// so subscriptions survive reconnects of the clean session.
    pub fn connect(config: &GatewayConfig, router: Arc<InboundRouter>) -> (Self, JoinHandle<()>) {
        let options = mqtt_options(&config.subscriber_client_id, config, true);
        let (client, eventloop) = AsyncClient::new(options, REQUEST_CHANNEL_CAPACITY);

        let subscriptions = [
            (config.export_topic.clone(), QoS::AtMostOnce),
            (config.response_topic.clone(), QoS::AtLeastOnce),
        ];
        let subscriber = client.clone();
        let label = config.subscriber_client_id.clone();

        let handle = tokio::spawn(drive(eventloop, label, move |packet| match packet {
            Packet::ConnAck(_) => {
                for (filter, qos) in &subscriptions {
                    // The event loop is the only consumer of the request
                    // channel, so awaiting here would deadlock.
                    match subscriber.try_subscribe(filter.as_str(), *qos) {
                        Ok(()) => info!("Subscribed to {} ({:?})", filter, qos),
                        Err(e) => warn!("Failed to subscribe to {}: {}", filter, e),
                    }
                }
            }
            Packet::Publish(publish) => {
                debug!(
                    "Received MQTT message on topic: {}, payload length: {}",
                    publish.topic,
                    publish.payload.len()
                );
                router.spawn(publish.topic, publish.payload.to_vec());
            }
            _ => {}
        }));

        info!(
            "MQTT subscriber {} connecting to {}:{}",
            config.subscriber_client_id, config.broker_host, config.broker_port
        );
        (Self { client }, handle)
    }

    /// Send a DISCONNECT to the broker.
    pub async fn disconnect(&self) {
        if let Err(e) = self.client.disconnect().await {
            debug!("MQTT subscriber disconnect: {}", e);
        }
    }
}

/// Poll an event loop until the task is aborted.
///
/// `rumqttc` reconnects on the next poll after an error, so errors only pause
/// the loop; a streak of failures is escalated to `error!` once.
async fn drive<F>(mut eventloop: EventLoop, label: String, mut on_packet: F)
where
    F: FnMut(Packet) + Send + 'static,
{
    let mut error_count = 0u32;
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(packet)) => {
                if matches!(packet, Packet::ConnAck(_)) {
                    info!("MQTT client {} connection acknowledged", label);
                }
                error_count = 0;
                on_packet(packet);
            }
            Ok(Event::Outgoing(_)) => {}
            Err(e) => {
                error_count += 1;
                if error_count == MAX_POLL_ERRORS {
                    error!(
                        "MQTT client {} error count reached {}, still retrying: {}",
                        label, MAX_POLL_ERRORS, e
                    );
                } else if error_count < MAX_POLL_ERRORS {
                    warn!(
                        "MQTT client {} error ({}/{}): {}",
                        label, error_count, MAX_POLL_ERRORS, e
                    );
                } else {
                    debug!("MQTT client {} error: {}", label, e);
                }
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
}
