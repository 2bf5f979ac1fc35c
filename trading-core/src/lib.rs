//! Shared trading domain types for the dashboard stream client.
//!
//! - **value_objects**: instrument / strategy identifiers, [`EpochSeconds`]
//! - **time**: wire timestamp normalization (ISO-8601, epoch s, epoch ms)
//! - **series**: chart points ([`Candle`], [`FundingRate`], [`OpenInterestPoint`])
//! - **entities**: [`Trade`], [`Position`], [`PortfolioSummary`], [`SignalEvent`]

pub mod entities;
pub mod series;
pub mod time;
pub mod value_objects;

pub use value_objects::{EpochSeconds, InstrumentId, StrategyId};

pub use time::{TimeError, WireTime, from_epoch_millis, parse_iso8601};

pub use series::{Candle, FundingRate, OpenInterestPoint, TimePoint, is_time_ordered, sort_by_time};

pub use entities::{
    ExitReason, PortfolioSummary, Position, PositionSide, PositionStatus, SignalEvent, Trade,
    TradeType,
};
