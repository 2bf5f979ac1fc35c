use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Logical data stream multiplexed over the single connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Channel {
    #[serde(rename = "trades")]
    TradeEvents,
    #[serde(rename = "positions")]
    PositionEvents,
    #[serde(rename = "portfolio")]
    PortfolioUpdates,
    #[serde(rename = "prices")]
    PriceCandles,
    #[serde(rename = "funding")]
    FundingRates,
    #[serde(rename = "open_interest")]
    OpenInterest,
    #[serde(rename = "signals")]
    Signals,
}

impl Channel {
    pub const ALL: [Channel; 7] = [
        Channel::TradeEvents,
        Channel::PositionEvents,
        Channel::PortfolioUpdates,
        Channel::PriceCandles,
        Channel::FundingRates,
        Channel::OpenInterest,
        Channel::Signals,
    ];

    /// Logical name, as written in config files
    pub fn wire_name(&self) -> &'static str {
        match self {
            Channel::TradeEvents => "trades",
            Channel::PositionEvents => "positions",
            Channel::PortfolioUpdates => "portfolio",
            Channel::PriceCandles => "prices",
            Channel::FundingRates => "funding",
            Channel::OpenInterest => "open_interest",
            Channel::Signals => "signals",
        }
    }

    /// Server stream that delivers this channel. Funding and open interest
    /// ride on `prices` alongside the candles.
    pub fn carrier(&self) -> Channel {
        match self {
            Channel::FundingRates | Channel::OpenInterest => Channel::PriceCandles,
            other => *other,
        }
    }

    /// True when a subscription to `self` receives messages of `other`
    pub fn carries(&self, other: Channel) -> bool {
        *self == other || other.carrier() == *self
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownChannel(pub String);

impl fmt::Display for UnknownChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown channel: {}", self.0)
    }
}

impl std::error::Error for UnknownChannel {}

impl FromStr for Channel {
    type Err = UnknownChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|c| c.wire_name() == s)
            .ok_or_else(|| UnknownChannel(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_match_serde() {
        for channel in Channel::ALL {
            let json = serde_json::to_string(&channel).unwrap();
            assert_eq!(json, format!("\"{}\"", channel.wire_name()));
            assert_eq!(channel.wire_name().parse::<Channel>().unwrap(), channel);
        }
    }

    #[test]
    fn test_unknown_channel() {
        assert_eq!(
            "orderbook".parse::<Channel>(),
            Err(UnknownChannel("orderbook".to_string()))
        );
    }

    #[test]
    fn test_prices_carries_funding_and_open_interest() {
        assert_eq!(Channel::FundingRates.carrier(), Channel::PriceCandles);
        assert_eq!(Channel::OpenInterest.carrier(), Channel::PriceCandles);
        assert_eq!(Channel::Signals.carrier(), Channel::Signals);

        assert!(Channel::PriceCandles.carries(Channel::FundingRates));
        assert!(Channel::PriceCandles.carries(Channel::OpenInterest));
        assert!(Channel::FundingRates.carries(Channel::FundingRates));
        assert!(!Channel::FundingRates.carries(Channel::PriceCandles));
        assert!(!Channel::FundingRates.carries(Channel::OpenInterest));
    }
}
