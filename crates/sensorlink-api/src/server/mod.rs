//! Web server for SensorLink.
//!
//! Serves the command, export and response API and owns the bridge
//! lifecycle: the MQTT connections start once the listener is bound and are
//! closed after the server has drained.

pub mod router;
pub mod state;

pub use router::{create_router_with_state, MAX_REQUEST_BODY_SIZE};
pub use state::ServerState;

use anyhow::Context;
use sensorlink_bridge::BridgeService;
use sensorlink_core::GatewayConfig;

/// Start the bridge and serve the HTTP API until a shutdown signal arrives.
pub async fn run(config: GatewayConfig) -> anyhow::Result<()> {
    let bind = config.bind_address();

    let listener = tokio::net::TcpListener::bind(bind.as_str())
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;

    let bridge = BridgeService::start(&config)?;
    let state = ServerState::new(bridge.dispatcher(), bridge.forwarder(), config);
    let app = create_router_with_state(state);

    tracing::info!("SensorLink API listening on http://{}", bind);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(crate::shutdown::shutdown_signal())
        .await;

    bridge.shutdown().await;
    served?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
