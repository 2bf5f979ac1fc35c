//! Normalized inbound messages
//!
//! Every frame the classifier accepts becomes exactly one [`NormalizedMessage`].
//! All time fields are epoch seconds.

use trading_core::{
    Candle, FundingRate, InstrumentId, OpenInterestPoint, PortfolioSummary, Position, SignalEvent,
    Trade,
};

use super::channel::Channel;

/// Closed set of envelope `type` discriminators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    TradeNew,
    PositionOpened,
    PositionClosed,
    PositionPnlUpdate,
    PortfolioUpdate,
    PriceHistorical,
    PriceCandle,
    FundingHistorical,
    FundingUpdate,
    OpenInterestHistorical,
    OpenInterestUpdate,
    SignalNew,
}

impl MessageKind {
    /// Map a wire discriminator; unknown strings yield `None`
    pub fn from_wire(tag: &str) -> Option<Self> {
        let kind = match tag {
            "trade.new" => MessageKind::TradeNew,
            "position.opened" => MessageKind::PositionOpened,
            "position.closed" => MessageKind::PositionClosed,
            "position.pnl_update" => MessageKind::PositionPnlUpdate,
            "portfolio.update" => MessageKind::PortfolioUpdate,
            "price.historical" => MessageKind::PriceHistorical,
            "price.candle" => MessageKind::PriceCandle,
            "funding.historical" => MessageKind::FundingHistorical,
            "funding.update" => MessageKind::FundingUpdate,
            "oi.historical" | "open_interest.historical" => MessageKind::OpenInterestHistorical,
            "oi.update" | "open_interest.update" => MessageKind::OpenInterestUpdate,
            "signal.new" => MessageKind::SignalNew,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::TradeNew => "trade.new",
            MessageKind::PositionOpened => "position.opened",
            MessageKind::PositionClosed => "position.closed",
            MessageKind::PositionPnlUpdate => "position.pnl_update",
            MessageKind::PortfolioUpdate => "portfolio.update",
            MessageKind::PriceHistorical => "price.historical",
            MessageKind::PriceCandle => "price.candle",
            MessageKind::FundingHistorical => "funding.historical",
            MessageKind::FundingUpdate => "funding.update",
            MessageKind::OpenInterestHistorical => "oi.historical",
            MessageKind::OpenInterestUpdate => "oi.update",
            MessageKind::SignalNew => "signal.new",
        }
    }

    pub fn channel(&self) -> Channel {
        match self {
            MessageKind::TradeNew => Channel::TradeEvents,
            MessageKind::PositionOpened
            | MessageKind::PositionClosed
            | MessageKind::PositionPnlUpdate => Channel::PositionEvents,
            MessageKind::PortfolioUpdate => Channel::PortfolioUpdates,
            MessageKind::PriceHistorical | MessageKind::PriceCandle => Channel::PriceCandles,
            MessageKind::FundingHistorical | MessageKind::FundingUpdate => Channel::FundingRates,
            MessageKind::OpenInterestHistorical | MessageKind::OpenInterestUpdate => {
                Channel::OpenInterest
            }
            MessageKind::SignalNew => Channel::Signals,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionEventKind {
    Opened,
    Closed,
    PnlUpdate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionEvent {
    pub kind: PositionEventKind,
    pub position: Position,
}

/// Candle snapshot for one instrument, ascending by time
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistory {
    pub starlisting_id: InstrumentId,
    pub coin: Option<String>,
    pub interval: Option<String>,
    pub candles: Vec<Candle>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceCandle {
    pub starlisting_id: InstrumentId,
    pub coin: Option<String>,
    pub interval: Option<String>,
    pub candle: Candle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FundingHistory {
    pub starlisting_id: InstrumentId,
    pub coin: Option<String>,
    pub rates: Vec<FundingRate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FundingUpdate {
    pub starlisting_id: InstrumentId,
    pub rate: FundingRate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenInterestHistory {
    pub starlisting_id: InstrumentId,
    pub coin: Option<String>,
    pub points: Vec<OpenInterestPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenInterestUpdate {
    pub starlisting_id: InstrumentId,
    pub point: OpenInterestPoint,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedMessage {
    Trade(Trade),
    Position(PositionEvent),
    Portfolio(PortfolioSummary),
    PriceHistory(PriceHistory),
    PriceCandle(PriceCandle),
    FundingHistory(FundingHistory),
    FundingUpdate(FundingUpdate),
    OpenInterestHistory(OpenInterestHistory),
    OpenInterestUpdate(OpenInterestUpdate),
    Signal(SignalEvent),
}

impl NormalizedMessage {
    pub fn channel(&self) -> Channel {
        match self {
            NormalizedMessage::Trade(_) => Channel::TradeEvents,
            NormalizedMessage::Position(_) => Channel::PositionEvents,
            NormalizedMessage::Portfolio(_) => Channel::PortfolioUpdates,
            NormalizedMessage::PriceHistory(_) | NormalizedMessage::PriceCandle(_) => {
                Channel::PriceCandles
            }
            NormalizedMessage::FundingHistory(_) | NormalizedMessage::FundingUpdate(_) => {
                Channel::FundingRates
            }
            NormalizedMessage::OpenInterestHistory(_)
            | NormalizedMessage::OpenInterestUpdate(_) => Channel::OpenInterest,
            NormalizedMessage::Signal(_) => Channel::Signals,
        }
    }

    /// Instrument the message is about, if it names one
    pub fn instrument_id(&self) -> Option<InstrumentId> {
        match self {
            NormalizedMessage::Trade(t) => Some(t.starlisting_id),
            NormalizedMessage::Position(p) => Some(p.position.starlisting_id),
            NormalizedMessage::Portfolio(_) => None,
            NormalizedMessage::PriceHistory(m) => Some(m.starlisting_id),
            NormalizedMessage::PriceCandle(m) => Some(m.starlisting_id),
            NormalizedMessage::FundingHistory(m) => Some(m.starlisting_id),
            NormalizedMessage::FundingUpdate(m) => Some(m.starlisting_id),
            NormalizedMessage::OpenInterestHistory(m) => Some(m.starlisting_id),
            NormalizedMessage::OpenInterestUpdate(m) => Some(m.starlisting_id),
            NormalizedMessage::Signal(s) => s.starlisting_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_wire_known_and_aliases() {
        assert_eq!(MessageKind::from_wire("trade.new"), Some(MessageKind::TradeNew));
        assert_eq!(
            MessageKind::from_wire("open_interest.update"),
            Some(MessageKind::OpenInterestUpdate)
        );
        assert_eq!(
            MessageKind::from_wire("oi.historical"),
            Some(MessageKind::OpenInterestHistorical)
        );
        assert_eq!(MessageKind::from_wire("orderbook.delta"), None);
        assert_eq!(MessageKind::from_wire(""), None);
    }

    #[test]
    fn test_as_str_round_trips() {
        for tag in [
            "trade.new",
            "position.opened",
            "position.closed",
            "position.pnl_update",
            "portfolio.update",
            "price.historical",
            "price.candle",
            "funding.historical",
            "funding.update",
            "oi.historical",
            "oi.update",
            "signal.new",
        ] {
            assert_eq!(MessageKind::from_wire(tag).unwrap().as_str(), tag);
        }
    }

    #[test]
    fn test_kind_channels() {
        assert_eq!(MessageKind::PositionPnlUpdate.channel(), Channel::PositionEvents);
        assert_eq!(MessageKind::PriceCandle.channel(), Channel::PriceCandles);
        assert_eq!(MessageKind::FundingUpdate.channel(), Channel::FundingRates);
        assert_eq!(MessageKind::OpenInterestUpdate.channel(), Channel::OpenInterest);
    }

    #[test]
    fn test_message_routing_fields() {
        let msg = NormalizedMessage::PriceCandle(PriceCandle {
            starlisting_id: InstrumentId(9),
            coin: Some("BTC".into()),
            interval: Some("1m".into()),
            candle: Candle::new(1_704_067_200, 1.0, 2.0, 0.5, 1.5),
        });
        assert_eq!(msg.channel(), Channel::PriceCandles);
        assert_eq!(msg.instrument_id(), Some(InstrumentId(9)));

        let msg = NormalizedMessage::Portfolio(PortfolioSummary::default());
        assert_eq!(msg.channel(), Channel::PortfolioUpdates);
        assert_eq!(msg.instrument_id(), None);
    }
}
