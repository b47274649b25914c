//! Shared server state.

use std::sync::Arc;

use sensorlink_bridge::{CommandDispatcher, Forward};
use sensorlink_core::GatewayConfig;

/// State shared by all handlers. Read-only after startup.
#[derive(Clone)]
pub struct ServerState {
    pub dispatcher: Arc<CommandDispatcher>,
    pub forwarder: Arc<dyn Forward>,
    pub config: Arc<GatewayConfig>,
    /// Server start time (unix seconds).
    pub started_at: i64,
}

impl ServerState {
    pub fn new(
        dispatcher: Arc<CommandDispatcher>,
        forwarder: Arc<dyn Forward>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            dispatcher,
            forwarder,
            config: Arc::new(config),
            started_at: chrono::Utc::now().timestamp(),
        }
    }
}
