//! HTTP API for SensorLink.
//!
//! Operators send SET/GET commands to sensors through this API; sensor
//! exports and responses can also be relayed to the gateway API over HTTP.

pub mod handlers;
pub mod models;
pub mod server;
pub mod shutdown;

pub use server::{create_router_with_state, run, ServerState};
