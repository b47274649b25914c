//! API request and response models.

pub mod error;

use sensorlink_core::CommandTarget;
use serde::{Deserialize, Serialize};

pub use error::ErrorResponse;

/// Body of a SET command request.
#[derive(Debug, Clone, Deserialize)]
pub struct SetCommandRequest<T> {
    pub target: CommandTarget,
    pub resource_value: T,
}

/// Body of a GET command request.
#[derive(Debug, Clone, Deserialize)]
pub struct GetCommandRequest {
    pub target: CommandTarget,
}

/// Answer to an accepted command: the command was sent, not applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandAccepted {
    pub message: String,
    pub command_uuids: Vec<String>,
}

/// Plain acknowledgement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
