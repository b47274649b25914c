//! Common API handler utilities.

use axum::http::StatusCode;
use axum::Json;
use sensorlink_core::{Command, UpstreamEvent};
use tracing::info;

use super::ServerState;
use crate::models::{CommandAccepted, ErrorResponse, MessageResponse};

/// Result type for all API handlers: a status with a JSON body.
pub type HandlerResult<T> = Result<(StatusCode, Json<T>), ErrorResponse>;

/// Reply with `status` and `data`.
pub fn reply<T>(status: StatusCode, data: T) -> HandlerResult<T> {
    Ok((status, Json(data)))
}

/// Fan a command out to its targets and answer 202 with the correlation ids.
pub async fn send_command(
    state: &ServerState,
    command: Command,
    message: &str,
) -> HandlerResult<CommandAccepted> {
    let resource = command.resource();
    let method = command.method();
    let command_uuids = state.dispatcher.dispatch(command).await?;
    info!(
        "{} {} command sent to {} sensor(s)",
        method.as_str().to_uppercase(),
        resource,
        command_uuids.len()
    );
    reply(
        StatusCode::ACCEPTED,
        CommandAccepted {
            message: message.to_string(),
            command_uuids,
        },
    )
}

/// Forward an event upstream and answer `status` on success.
///
/// Upstream failures are returned to the caller with the upstream status
/// and body.
pub async fn forward_event(
    state: &ServerState,
    event: UpstreamEvent,
    status: StatusCode,
    message: &str,
) -> HandlerResult<MessageResponse> {
    state.forwarder.forward(&event).await?;
    reply(status, MessageResponse::new(message))
}
