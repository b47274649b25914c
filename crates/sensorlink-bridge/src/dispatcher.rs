//! Command fan-out.
//!
//! A [`Command`] addressed to N sensors becomes N publishes, each on its own
//! topic with its own correlation id. Correlation ids are returned to the
//! caller and not tracked afterwards.

use std::sync::Arc;

use rumqttc::QoS;
use sensorlink_core::{
    encode_command_payload, encode_command_topic, Command, DispatchedCommand, Error, Resource,
    Result,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::mqtt::CommandPublisher;

pub struct CommandDispatcher {
    publisher: Arc<dyn CommandPublisher>,
    latency_benchmark_enabled: bool,
}

impl CommandDispatcher {
    pub fn new(publisher: Arc<dyn CommandPublisher>, latency_benchmark_enabled: bool) -> Self {
        Self {
            publisher,
            latency_benchmark_enabled,
        }
    }

    pub fn latency_benchmark_enabled(&self) -> bool {
        self.latency_benchmark_enabled
    }

    /// Reject commands whose feature is switched off.
    pub fn check_enabled(&self, command: &Command) -> Result<()> {
        if command.resource() == Resource::InfLatencyBench && !self.latency_benchmark_enabled {
            return Err(Error::FeatureDisabled(
                "Latency Benchmarking is disabled".to_string(),
            ));
        }
        Ok(())
    }

    /// Build one publish per target, in target order, each with a fresh
    /// correlation id. Nothing is sent.
    pub fn plan(&self, command: &Command) -> Result<Vec<DispatchedCommand>> {
        let payload = encode_command_payload(command)?;
        command
            .target()
            .iter()
            .map(|target| {
                let correlation_id = Uuid::new_v4().to_string();
                let topic = encode_command_topic(
                    target,
                    command.resource(),
                    command.method(),
                    &correlation_id,
                )?;
                Ok(DispatchedCommand {
                    target: target.clone(),
                    correlation_id,
                    topic,
                    payload: payload.clone(),
                })
            })
            .collect()
    }

    /// Publish a command to every target and return the correlation ids.
    ///
    /// Publishes go out at QoS 1 without retain. The first failing publish
    /// stops the fan-out: earlier targets stay commanded, later targets are
    /// not attempted, and the error lists what was already sent.
    pub async fn dispatch(&self, command: Command) -> Result<Vec<String>> {
        self.check_enabled(&command)?;
        let planned = self.plan(&command)?;

        let mut published = Vec::with_capacity(planned.len());
        for dispatched in planned {
            if let Err(e) = self
                .publisher
                .publish(&dispatched.topic, dispatched.payload, QoS::AtLeastOnce, false)
                .await
            {
                error!(
                    "Command publish to {} failed after {} of {} targets: {}",
                    dispatched.target,
                    published.len(),
                    command.target().len(),
                    e
                );
                return Err(Error::PartialDispatch {
                    published,
                    failed_target: dispatched.target,
                    reason: e.to_string(),
                });
            }
            info!("Command sent to topic {}", dispatched.topic);
            published.push(dispatched.correlation_id);
        }
        Ok(published)
    }
}
