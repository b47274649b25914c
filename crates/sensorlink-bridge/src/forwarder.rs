//! Upstream forwarding.

use std::time::Duration;

use async_trait::async_trait;
use sensorlink_core::{Error, GatewayConfig, Result, UpstreamEvent};
use tracing::{debug, info};

/// Sends canonical events to the upstream gateway service.
#[async_trait]
pub trait Forward: Send + Sync {
    /// Deliver one event. A single attempt; the caller decides what a
    /// failure means.
    async fn forward(&self, event: &UpstreamEvent) -> Result<()>;
}

/// HTTP forwarder posting events as JSON.
#[derive(Clone)]
pub struct GatewayForwarder {
    client: reqwest::Client,
    base_url: String,
}

impl GatewayForwarder {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        Self::new(
            config.gateway_api_url.clone(),
            Duration::from_secs(config.upstream_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, event: &UpstreamEvent) -> String {
        format!("{}{}", self.base_url, event.endpoint().path)
    }
}

#[async_trait]
impl Forward for GatewayForwarder {
    async fn forward(&self, event: &UpstreamEvent) -> Result<()> {
        let endpoint = event.endpoint();
        let url = self.url_for(event);
        debug!("Forwarding {} to {}", event.kind(), url);

        let response = self
            .client
            .post(&url)
            .json(event)
            .send()
            .await
            .map_err(|e| Error::Http(format!("POST {}: {}", url, e)))?;

        let status = response.status().as_u16();
        if status != endpoint.expected_status {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream { status, body });
        }

        info!("Forwarded {} to {} ({})", event.kind(), endpoint.path, status);
        Ok(())
    }
}
