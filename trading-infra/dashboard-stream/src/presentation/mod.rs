//! Presentation Layer - Outbound interfaces to downstream consumers
//!
//! - ChartFeed: drives a charting sink from normalized stream messages
//!
//! Follows Hexagonal Architecture:
//! - Infrastructure = inbound (server → client)
//! - Presentation = outbound (client → chart sinks)

mod chart;

pub use chart::{
    ChartFeed, ChartPoint, ChartSink, DEFAULT_MARKER_CAPACITY, MarkerPosition, MarkerShape,
    TradeMarker,
};
