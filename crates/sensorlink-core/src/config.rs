//! Gateway configuration.
//!
//! All settings come from environment variables with defaults. Unset
//! variables fall back to the default; set but unparsable numeric values are
//! a startup error.

use std::str::FromStr;

use crate::codec::{SensorReadingLayout, DEFAULT_SAMPLE_SIZE, DEFAULT_SEQUENCE_LENGTH};
use crate::config_err;
use crate::error::Result;

/// Default values.
pub mod defaults {
    pub const HTTP_HOST: &str = "127.0.0.1";
    pub const HTTP_PORT: u16 = 8008;
    pub const BROKER_HOST: &str = "127.0.0.1";
    pub const BROKER_PORT: u16 = 1883;
    pub const PUBLISHER_CLIENT_ID: &str = "mqtt-sensor-ms-publisher";
    pub const SUBSCRIBER_CLIENT_ID: &str = "mqtt-sensor-ms-subscriber";
    pub const EXPORT_TOPIC: &str = "export/#";
    pub const RESPONSE_TOPIC: &str = "response/#";
    pub const GATEWAY_API_URL: &str = "http://127.0.0.1:8004/api/v1";
    pub const GATEWAY_NAME: &str = "gateway_1";
    pub const LATENCY_BENCHMARK: bool = true;
    pub const UPSTREAM_TIMEOUT_SECS: u64 = 30;
    pub const MQTT_KEEP_ALIVE_SECS: u64 = 60;
}

/// Environment variable names.
pub mod env_vars {
    pub const HTTP_HOST: &str = "MQTT_SENSOR_MICROSERVICE_HOST";
    pub const HTTP_PORT: &str = "MQTT_SENSOR_MICROSERVICE_PORT";
    pub const BROKER_HOST: &str = "MQTT_BROKER_HOST";
    pub const BROKER_PORT: &str = "MQTT_BROKER_PORT";
    pub const PUBLISHER_CLIENT_ID: &str = "MQTT_PUBLISHER_CLIENT_ID";
    pub const SUBSCRIBER_CLIENT_ID: &str = "MQTT_SUBSCRIBER_CLIENT_ID";
    pub const EXPORT_TOPIC: &str = "DEVICE_EXPORT_TOPIC";
    pub const RESPONSE_TOPIC: &str = "DEVICE_RESPONSE_TOPIC";
    pub const GATEWAY_API_URL: &str = "GATEWAY_API_URL";
    pub const GATEWAY_NAME: &str = "GATEWAY_NAME";
    pub const LATENCY_BENCHMARK: &str = "LATENCY_BENCHMARK";
    pub const SEQUENCE_LENGTH: &str = "SEQUENCE_LENGTH";
    pub const SAMPLE_SIZE: &str = "SAMPLE_SIZE";
    pub const MAX_INFLIGHT: &str = "SENSORLINK_MAX_INFLIGHT";
    pub const UPSTREAM_TIMEOUT_SECS: &str = "UPSTREAM_TIMEOUT_SECS";
    pub const MQTT_KEEP_ALIVE_SECS: &str = "MQTT_KEEP_ALIVE_SECS";
    /// Emit JSON log lines instead of the compact format.
    pub const LOG_JSON: &str = "SENSORLINK_LOG_JSON";
}

/// Runtime configuration of the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub http_host: String,
    pub http_port: u16,
    pub broker_host: String,
    pub broker_port: u16,
    pub publisher_client_id: String,
    pub subscriber_client_id: String,
    /// Subscription filter for exports, e.g. `export/#`.
    pub export_topic: String,
    /// Subscription filter for command responses, e.g. `response/#`.
    pub response_topic: String,
    /// Base URL of the upstream gateway service.
    pub gateway_api_url: String,
    pub gateway_name: String,
    pub latency_benchmark: bool,
    pub sequence_length: usize,
    pub sample_size: usize,
    /// Cap on concurrently handled inbound messages. `None` is unbounded.
    pub max_inflight: Option<usize>,
    pub upstream_timeout_secs: u64,
    pub mqtt_keep_alive_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            http_host: defaults::HTTP_HOST.to_string(),
            http_port: defaults::HTTP_PORT,
            broker_host: defaults::BROKER_HOST.to_string(),
            broker_port: defaults::BROKER_PORT,
            publisher_client_id: defaults::PUBLISHER_CLIENT_ID.to_string(),
            subscriber_client_id: defaults::SUBSCRIBER_CLIENT_ID.to_string(),
            export_topic: defaults::EXPORT_TOPIC.to_string(),
            response_topic: defaults::RESPONSE_TOPIC.to_string(),
            gateway_api_url: defaults::GATEWAY_API_URL.to_string(),
            gateway_name: defaults::GATEWAY_NAME.to_string(),
            latency_benchmark: defaults::LATENCY_BENCHMARK,
            sequence_length: DEFAULT_SEQUENCE_LENGTH,
            sample_size: DEFAULT_SAMPLE_SIZE,
            max_inflight: None,
            upstream_timeout_secs: defaults::UPSTREAM_TIMEOUT_SECS,
            mqtt_keep_alive_secs: defaults::MQTT_KEEP_ALIVE_SECS,
        }
    }
}

impl GatewayConfig {
    /// Load the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = Self::default();
        let string = |key: &str, default: String| lookup(key).unwrap_or(default);

        let max_inflight = match lookup(env_vars::MAX_INFLIGHT) {
            None => None,
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => Some(parse_value::<usize>(env_vars::MAX_INFLIGHT, &raw)?),
        };
        if max_inflight == Some(0) {
            return Err(config_err!("{} must be greater than 0", env_vars::MAX_INFLIGHT));
        }

        let config = Self {
            http_host: string(env_vars::HTTP_HOST, base.http_host),
            http_port: parse_var(&lookup, env_vars::HTTP_PORT, base.http_port)?,
            broker_host: string(env_vars::BROKER_HOST, base.broker_host),
            broker_port: parse_var(&lookup, env_vars::BROKER_PORT, base.broker_port)?,
            publisher_client_id: string(env_vars::PUBLISHER_CLIENT_ID, base.publisher_client_id),
            subscriber_client_id: string(
                env_vars::SUBSCRIBER_CLIENT_ID,
                base.subscriber_client_id,
            ),
            export_topic: string(env_vars::EXPORT_TOPIC, base.export_topic),
            response_topic: string(env_vars::RESPONSE_TOPIC, base.response_topic),
            gateway_api_url: string(env_vars::GATEWAY_API_URL, base.gateway_api_url)
                .trim_end_matches('/')
                .to_string(),
            gateway_name: string(env_vars::GATEWAY_NAME, base.gateway_name),
            latency_benchmark: match lookup(env_vars::LATENCY_BENCHMARK) {
                Some(raw) => parse_flag(env_vars::LATENCY_BENCHMARK, &raw)?,
                None => base.latency_benchmark,
            },
            sequence_length: parse_var(&lookup, env_vars::SEQUENCE_LENGTH, base.sequence_length)?,
            sample_size: parse_var(&lookup, env_vars::SAMPLE_SIZE, base.sample_size)?,
            max_inflight,
            upstream_timeout_secs: parse_var(
                &lookup,
                env_vars::UPSTREAM_TIMEOUT_SECS,
                base.upstream_timeout_secs,
            )?,
            mqtt_keep_alive_secs: parse_var(
                &lookup,
                env_vars::MQTT_KEEP_ALIVE_SECS,
                base.mqtt_keep_alive_secs,
            )?,
        };

        if config.sequence_length == 0 || config.sample_size == 0 {
            return Err(config_err!(
                "reading layout must be non-empty, got {} x {}",
                config.sequence_length,
                config.sample_size
            ));
        }
        Ok(config)
    }

    /// Wire layout of inbound sensor readings.
    pub fn layout(&self) -> SensorReadingLayout {
        SensorReadingLayout::new(self.sequence_length, self.sample_size)
    }

    /// `host:port` of the HTTP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| config_err!("invalid value for {}: '{}'", key, raw))
}

fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(config_err!("invalid flag for {}: '{}'", key, raw)),
    }
}
