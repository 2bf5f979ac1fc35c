//! Dashboard Stream Crate
//!
//! Client-side multiplexer for the trading dashboard's live data: one
//! WebSocket connection carrying several independently filtered channels.
//!
//! # Architecture
//!
//! The client:
//! - Keeps one connection open and reconnects after unintentional closes
//! - Merges every consumer's filters per channel and replays them on reconnect
//! - Decodes frames once into typed, time-normalized messages
//! - Fans messages out to consumers, each filtered to its own instruments
//!
//! ```text
//! ┌─────────────┐  ┌─────────────┐  ┌─────────────┐
//! │ Price chart │  │ Trade table │  │ Status icon │
//! └──────┬──────┘  └──────┬──────┘  └──────┬──────┘
//!        │ Subscription   │                │ watch_state
//!        ▼                ▼                ▼
//! ┌──────────────────────────────────────────────────────┐
//! │                    StreamClient                      │
//! │  ┌────────────────────────────────────────────────┐  │
//! │  │ ListenerHub (copy-on-dispatch listener sets)   │  │
//! │  └────────────────────────────────────────────────┘  │
//! │                         ▲                            │
//! │  ┌──────────────────────┴─────────────────────────┐  │
//! │  │ ConnectionController                           │  │
//! │  │  ChannelRegistry (merged filters per channel)  │  │
//! │  │  MessageClassifier (decode + normalize time)   │  │
//! │  └────────────────────────────────────────────────┘  │
//! └──────────────────────────┬───────────────────────────┘
//!                            │ Transport (WebSocket / loopback)
//!                            ▼
//!                     ┌─────────────┐
//!                     │ Stream API  │
//!                     └─────────────┘
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

// Re-export key types
pub use domain::{
    Channel, ChannelFilterState, ChannelRegistry, CloseEvent, ConnectionState, Directive,
    FilterDelta, MessageKind, NormalizedMessage, OutboundFrame, PositionEvent, PositionEventKind,
    Transport, TransportEvent, TransportLink,
};
pub use error::{DecodeError, StreamError};

pub use application::{
    ConnectionController, ListenerHandle, ListenerHub, QueryKey, StreamClient, Subscription,
    SubscriptionHandler, SubscriptionRequest, invalidation_keys,
};

pub use infrastructure::{
    LoopbackServer, LoopbackSession, LoopbackTransport, MessageClassifier, WsTransport,
    loopback_pair,
};

pub use presentation::{ChartFeed, ChartPoint, ChartSink, TradeMarker};

pub use config::{
    ConfigError, StreamConfig, StreamConfigFile, SubscriptionConfig, load_config,
    load_default_config,
};
