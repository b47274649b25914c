//! Typed handlers for inbound MQTT messages.

pub mod export;
pub mod response;

pub use export::{ExportHandler, ExportKind};
pub use response::ResponseHandler;

use sensorlink_core::{Result, UpstreamEvent};
use tracing::error;

use crate::forwarder::Forward;

/// Forward events in order.
///
/// A failed forward does not stop the remaining ones; each failure is logged
/// and the first one is returned.
pub(crate) async fn forward_all(forwarder: &dyn Forward, events: &[UpstreamEvent]) -> Result<()> {
    let mut first_error = None;
    for event in events {
        if let Err(e) = forwarder.forward(event).await {
            error!("Failed to forward {}: {}", event.kind(), e);
            first_error.get_or_insert(e);
        }
    }
    first_error.map_or(Ok(()), Err)
}
