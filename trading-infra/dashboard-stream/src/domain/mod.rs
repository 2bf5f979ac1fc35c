pub mod channel;
pub mod connection;
pub mod directive;
pub mod filter;
pub mod message;
pub mod registry;
pub mod traits;

pub use channel::{Channel, UnknownChannel};
pub use connection::{CloseEvent, ConnectionState};
pub use directive::{Directive, DirectiveFilters};
pub use filter::{ChannelFilterState, FilterDelta};
pub use message::{
    FundingHistory, FundingUpdate, MessageKind, NormalizedMessage, OpenInterestHistory,
    OpenInterestUpdate, PositionEvent, PositionEventKind, PriceCandle, PriceHistory,
};
pub use registry::ChannelRegistry;
pub use traits::{OutboundFrame, Transport, TransportEvent, TransportLink};
