//! Error types for plategate
//!
//! Submission-time errors are returned to the caller and abort the flow.
//! During polling only [`GateError::Transport`] is recoverable; everything
//! else ends the poll.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GateError {
    /// No artifact could be produced (e.g. no camera frame available)
    #[error("Upload error: {0}")]
    Upload(String),

    /// Network failure or non-2xx response from the backend
    #[error("{}", transport_message(.status, .message))]
    Transport { status: Option<u16>, message: String },

    /// Polling budget exhausted without a terminal state
    #[error("Timed out after {}ms without a result", .0.as_millis())]
    Timeout(Duration),

    /// Malformed event or status payload
    #[error("Correlation error: {0}")]
    Correlation(String),

    /// Invalid configuration or polling parameters
    #[error("Configuration error: {0}")]
    Config(String),
}

fn transport_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("Transport error (HTTP {code}): {message}"),
        None => format!("Transport error: {message}"),
    }
}

impl GateError {
    pub fn transport(message: impl Into<String>) -> Self {
        GateError::Transport {
            status: None,
            message: message.into(),
        }
    }

    /// Transient errors are swallowed by the poll loop.
    pub fn is_transient(&self) -> bool {
        matches!(self, GateError::Transport { .. })
    }
}

impl From<reqwest::Error> for GateError {
    fn from(err: reqwest::Error) -> Self {
        // a body that fails to decode is the backend's fault, not the network's
        if err.is_decode() {
            return GateError::Correlation(format!("malformed response: {err}"));
        }
        GateError::Transport {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_is_transient() {
        assert!(GateError::transport("connection reset").is_transient());
        assert!(!GateError::Correlation("bad".into()).is_transient());
        assert!(!GateError::Upload("no frame".into()).is_transient());
        assert!(!GateError::Timeout(Duration::from_secs(5)).is_transient());
    }

    #[test]
    fn display_includes_status_code() {
        let err = GateError::Transport {
            status: Some(404),
            message: "Session not found".into(),
        };
        assert_eq!(err.to_string(), "Transport error (HTTP 404): Session not found");
        assert_eq!(
            GateError::Timeout(Duration::from_millis(5000)).to_string(),
            "Timed out after 5000ms without a result"
        );
    }
}
