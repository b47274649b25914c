//! Unified error handling for SensorLink.
//!
//! Every layer of the bridge reports failures through [`Error`]. The variants
//! follow the failure taxonomy of the bridge: malformed or unknown inbound
//! messages are dropped, decode failures are fatal for a single message,
//! upstream failures keep the upstream status and body.

/// Unified error type for SensorLink.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Topic with the wrong number of segments.
    #[error("Invalid topic '{topic}': expected {expected} segments, found {found}")]
    InvalidArity {
        topic: String,
        expected: usize,
        found: usize,
    },

    /// Topic with the right arity but a wrong family prefix or an empty segment.
    #[error("Invalid topic: {0}")]
    InvalidTopic(String),

    /// Topic that matches none of the subscribed filters.
    #[error("Unknown topic: {0}")]
    UnknownTopic(String),

    /// Resource name outside the known resource set.
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    /// Export name outside the known export set.
    #[error("Unknown export name: {0}")]
    UnknownExportName(String),

    /// Method other than `get`/`set`, or a method that is not handled.
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    /// Binary sensor reading could not be decoded.
    #[error("Decode failure: {0}")]
    Decode(String),

    /// Payload is valid JSON but violates the message contract.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Upstream service answered with an unexpected status.
    #[error("Upstream failure ({status}): {body}")]
    Upstream { status: u16, body: String },

    /// Request to the upstream service could not be completed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Command rejected because the feature behind it is turned off.
    #[error("Feature disabled: {0}")]
    FeatureDisabled(String),

    /// A single MQTT publish failed.
    #[error("Publish error: {0}")]
    Publish(String),

    /// Multi-target dispatch stopped at a failing target.
    #[error("Dispatch to '{failed_target}' failed after {} published: {reason}", .published.len())]
    PartialDispatch {
        published: Vec<String>,
        failed_target: String,
        reason: String,
    },

    /// Configuration errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization errors.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Whether the message that caused this error is simply dropped.
    ///
    /// Drop-class errors describe messages the bridge does not understand;
    /// they are logged and never reach the upstream service.
    pub fn is_drop(&self) -> bool {
        matches!(
            self,
            Error::InvalidArity { .. }
                | Error::InvalidTopic(_)
                | Error::UnknownTopic(_)
                | Error::UnknownResource(_)
                | Error::UnknownExportName(_)
                | Error::UnknownMethod(_)
        )
    }
}

/// Result type alias for convenience.
pub type Result<T> = std::result::Result<T, Error>;

#[macro_export]
macro_rules! decode_err {
    ($msg:expr) => {
        $crate::error::Error::Decode($msg.into())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::Error::Decode(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! config_err {
    ($msg:expr) => {
        $crate::error::Error::Config($msg.into())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::Error::Config(format!($fmt, $($arg)*))
    };
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(e: base64::DecodeError) -> Self {
        Error::Decode(format!("base64: {}", e))
    }
}
