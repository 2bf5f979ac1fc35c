//! Error types for the dashboard-stream crate

use thiserror::Error;
use trading_core::TimeError;

/// Connection and control-plane errors
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Timeout waiting for connection")]
    Timeout,

    #[error("Link closed")]
    ChannelClosed,

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<tokio_tungstenite::tungstenite::Error> for StreamError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        StreamError::Connection(e.to_string())
    }
}

/// Inbound frame decode failures
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Frame is not a JSON envelope: {0}")]
    Json(#[source] serde_json::Error),

    #[error("Invalid {kind} payload: {source}")]
    Payload {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid timestamp: {0}")]
    Time(#[from] TimeError),
}
