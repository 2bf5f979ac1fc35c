use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::StreamError;

/// Frame queued for the transport writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    Text(String),
    Close,
}

/// What the transport reader reports back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Frame(String),
    Error(String),
    Closed(Option<String>),
}

/// An open connection, split into its two directions
pub struct TransportLink {
    pub outbound: mpsc::UnboundedSender<OutboundFrame>,
    pub inbound: mpsc::Receiver<TransportEvent>,
}

/// Port for the streaming connection. Infrastructure provides the adapters.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn open(&self) -> Result<TransportLink, StreamError>;
}
