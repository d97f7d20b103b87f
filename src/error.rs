//! Canonical error and result types for the crate.
//!
//! Connect and send surface failures as [`ClientError`]. Errors raised inside
//! the read loop never reach a caller; they are reported as system events.

use std::{io, time::Duration};

/// Errors returned by [`crate::client::StompClient`] operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport or codec error.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
    /// WebSocket handshake or transport error.
    #[error("websocket error: {0}")]
    WebSocket(#[from] Box<tokio_tungstenite::tungstenite::Error>),
    /// The broker address could not be understood.
    #[error("invalid endpoint {input:?}: {reason}")]
    InvalidEndpoint {
        /// Address as supplied.
        input: String,
        /// What was wrong with it.
        reason: String,
    },
    /// The broker connection string could not be parsed.
    #[error("invalid connection string: {0}")]
    InvalidConnectionString(#[from] url::ParseError),
    /// Failed to serialize an outbound chat message.
    #[error("failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The session did not reach the expected state in time.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(error))
    }
}

impl ClientError {
    pub(crate) fn invalid_endpoint(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            input: input.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Result alias used by the client API.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_failing_layer() {
        let err = ClientError::from(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        assert_eq!(err.to_string(), "transport error: refused");

        let err = ClientError::invalid_endpoint("::", "missing host");
        assert_eq!(err.to_string(), r#"invalid endpoint "::": missing host"#);

        let err = ClientError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "timed out after 250ms");
    }

    #[test]
    fn tungstenite_errors_are_boxed() {
        let err = ClientError::from(tokio_tungstenite::tungstenite::Error::ConnectionClosed);
        assert!(matches!(err, ClientError::WebSocket(_)));
    }
}
