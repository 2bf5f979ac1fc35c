//! Query-cache keys made stale by live messages

use std::fmt;
use trading_core::StrategyId;

use crate::domain::NormalizedMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Trades,
    Positions,
    Portfolio,
    StrategyStats(StrategyId),
}

impl QueryKey {
    /// Key path as used by the fetch layer, e.g. `["strategy", "3", "stats"]`
    pub fn segments(&self) -> Vec<String> {
        match self {
            QueryKey::Trades => vec!["trades".into()],
            QueryKey::Positions => vec!["positions".into()],
            QueryKey::Portfolio => vec!["portfolio".into()],
            QueryKey::StrategyStats(id) => {
                vec!["strategy".into(), id.to_string(), "stats".into()]
            }
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments().join("/"))
    }
}

/// Keys to invalidate after `message`. Trade and position events also touch
/// the stats of `strategy_id` when the consumer is scoped to one strategy.
pub fn invalidation_keys(
    message: &NormalizedMessage,
    strategy_id: Option<StrategyId>,
) -> Vec<QueryKey> {
    let primary = match message {
        NormalizedMessage::Trade(_) => QueryKey::Trades,
        NormalizedMessage::Position(_) => QueryKey::Positions,
        NormalizedMessage::Portfolio(_) => return vec![QueryKey::Portfolio],
        _ => return Vec::new(),
    };

    let mut keys = vec![primary];
    if let Some(id) = strategy_id {
        keys.push(QueryKey::StrategyStats(id));
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PriceCandle, PositionEvent, PositionEventKind};
    use trading_core::{Candle, InstrumentId, PortfolioSummary, Position};

    fn position() -> NormalizedMessage {
        let position: Position =
            serde_json::from_str(r#"{"id": 1, "strategy_id": 3, "starlisting_id": 6}"#).unwrap();
        NormalizedMessage::Position(PositionEvent {
            kind: PositionEventKind::Opened,
            position,
        })
    }

    #[test]
    fn test_position_keys() {
        assert_eq!(invalidation_keys(&position(), None), vec![QueryKey::Positions]);
        assert_eq!(
            invalidation_keys(&position(), Some(StrategyId(3))),
            vec![QueryKey::Positions, QueryKey::StrategyStats(StrategyId(3))]
        );
    }

    #[test]
    fn test_portfolio_ignores_strategy() {
        let msg = NormalizedMessage::Portfolio(PortfolioSummary::default());
        assert_eq!(
            invalidation_keys(&msg, Some(StrategyId(3))),
            vec![QueryKey::Portfolio]
        );
    }

    #[test]
    fn test_chart_data_invalidates_nothing() {
        let msg = NormalizedMessage::PriceCandle(PriceCandle {
            starlisting_id: InstrumentId(6),
            coin: None,
            interval: None,
            candle: Candle::new(0, 1.0, 1.0, 1.0, 1.0),
        });
        assert!(invalidation_keys(&msg, Some(StrategyId(1))).is_empty());
    }

    #[test]
    fn test_segments() {
        assert_eq!(
            QueryKey::StrategyStats(StrategyId(3)).segments(),
            vec!["strategy", "3", "stats"]
        );
        assert_eq!(QueryKey::Trades.to_string(), "trades");
    }
}
