//! Infrastructure Layer - adapters for the stream server
//!
//! - WsTransport: WebSocket connection (tokio-tungstenite)
//! - LoopbackTransport: in-process pair used by tests and demos
//! - MessageClassifier: inbound frame decoding and time normalization
//!
//! Follows Hexagonal Architecture:
//! - Infrastructure = inbound (server → client)
//! - Presentation = outbound (client → chart sinks)

pub mod classifier;
pub mod loopback;
pub mod wire;
pub mod ws_transport;

pub use classifier::MessageClassifier;
pub use loopback::{LoopbackServer, LoopbackSession, LoopbackTransport, loopback_pair};
pub use ws_transport::WsTransport;
