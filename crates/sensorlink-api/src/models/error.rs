//! Unified error handling for the API.

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sensorlink_core::Error;
use serde::Serialize;
use serde_json::Value;

/// API error response with an HTTP status.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// HTTP status code.
    #[serde(skip)]
    pub status: StatusCode,
    /// Extra context, e.g. the upstream response body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            status,
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Bad request (400).
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message, StatusCode::BAD_REQUEST)
    }

    /// Feature switched off (400).
    pub fn feature_disabled(message: impl Into<String>) -> Self {
        Self::new("FEATURE_DISABLED", message, StatusCode::BAD_REQUEST)
    }

    /// Internal server error (500).
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message, StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Bad gateway (502).
    pub fn bad_gateway(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, message, StatusCode::BAD_GATEWAY)
    }

    /// Upstream answered with an unexpected status.
    ///
    /// Error statuses are passed through; anything else becomes 502.
    pub fn upstream(status: u16, body: &str) -> Self {
        let status_code = StatusCode::from_u16(status)
            .ok()
            .filter(|s| s.is_client_error() || s.is_server_error())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        let details =
            serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()));
        Self::new(
            "UPSTREAM_ERROR",
            format!("Gateway API answered with status {}", status),
            status_code,
        )
        .with_details(details)
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = self.status;
        let body = serde_json::json!({
            "success": false,
            "error": self,
        });
        (status, axum::Json(body)).into_response()
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ErrorResponse {}

impl From<Error> for ErrorResponse {
    fn from(e: Error) -> Self {
        match e {
            Error::FeatureDisabled(message) => Self::feature_disabled(message),
            Error::Upstream { status, body } => Self::upstream(status, &body),
            Error::Http(message) => Self::bad_gateway("UPSTREAM_UNREACHABLE", message),
            Error::PartialDispatch {
                ref published,
                ref failed_target,
                ..
            } => Self::bad_gateway("PUBLISH_FAILED", e.to_string()).with_details(
                serde_json::json!({
                    "command_uuids": published,
                    "failed_target": failed_target,
                }),
            ),
            Error::Publish(_) => Self::bad_gateway("PUBLISH_FAILED", e.to_string()),
            Error::InvalidArity { .. }
            | Error::InvalidTopic(_)
            | Error::UnknownTopic(_)
            | Error::UnknownResource(_)
            | Error::UnknownExportName(_)
            | Error::UnknownMethod(_)
            | Error::Decode(_)
            | Error::InvalidPayload(_) => Self::bad_request(e.to_string()),
            Error::Config(_) | Error::Serialization(_) => Self::internal(e.to_string()),
        }
    }
}

impl From<anyhow::Error> for ErrorResponse {
    fn from(e: anyhow::Error) -> Self {
        Self::internal(e.to_string())
    }
}
