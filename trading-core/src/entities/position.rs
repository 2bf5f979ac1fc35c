use serde::{Deserialize, Serialize};

use crate::time::serde_helpers::option_epoch_millis;
use crate::value_objects::{EpochSeconds, InstrumentId, StrategyId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSide {
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionStatus {
    Open,
    Closed,
    Liquidated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    Signal,
    StopLoss,
    TakeProfit,
    Manual,
}

/// A strategy position as pushed on the positions channel.
///
/// PnL updates carry a partial view, so everything past the identity fields
/// is optional or defaulted. Timestamps are epoch milliseconds on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Position {
    pub id: u64,
    pub strategy_id: StrategyId,
    pub starlisting_id: InstrumentId,
    #[serde(default)]
    pub side: Option<PositionSide>,
    #[serde(default)]
    pub size: f64,
    #[serde(default)]
    pub entry_price: f64,
    #[serde(default, deserialize_with = "option_epoch_millis")]
    pub entry_timestamp: Option<EpochSeconds>,
    #[serde(default)]
    pub exit_price: Option<f64>,
    #[serde(default, deserialize_with = "option_epoch_millis")]
    pub exit_timestamp: Option<EpochSeconds>,
    #[serde(default)]
    pub exit_reason: Option<ExitReason>,
    #[serde(default)]
    pub realized_pnl: Option<f64>,
    #[serde(default)]
    pub unrealized_pnl: Option<f64>,
    #[serde(default)]
    pub fees_paid: f64,
    #[serde(default)]
    pub status: Option<PositionStatus>,
    #[serde(default)]
    pub stop_loss_price: Option<f64>,
    #[serde(default)]
    pub take_profit_price: Option<f64>,
    #[serde(default)]
    pub strategy_name: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<f64>,
    #[serde(default)]
    pub pnl_pct: Option<f64>,
    #[serde(default, deserialize_with = "option_epoch_millis")]
    pub created_at: Option<EpochSeconds>,
    #[serde(default, deserialize_with = "option_epoch_millis")]
    pub updated_at: Option<EpochSeconds>,
}

impl Position {
    pub fn is_open(&self) -> bool {
        matches!(self.status, Some(PositionStatus::Open) | None) && self.exit_timestamp.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_position() {
        let json = r#"{
            "id": 11,
            "strategy_id": 2,
            "starlisting_id": 9,
            "side": "short",
            "size": 1.0,
            "entry_price": 100.0,
            "entry_timestamp": 1704067200000,
            "exit_price": 90.0,
            "exit_timestamp": 1704070800000,
            "exit_reason": "take_profit",
            "realized_pnl": 10.0,
            "status": "closed"
        }"#;

        let position: Position = serde_json::from_str(json).unwrap();
        assert_eq!(position.side, Some(PositionSide::Short));
        assert_eq!(position.entry_timestamp, Some(1_704_067_200));
        assert_eq!(position.exit_timestamp, Some(1_704_070_800));
        assert_eq!(position.exit_reason, Some(ExitReason::TakeProfit));
        assert!(!position.is_open());
    }

    #[test]
    fn test_partial_pnl_update() {
        let json = r#"{"id": 11, "strategy_id": 2, "starlisting_id": 9, "unrealized_pnl": -3.5}"#;
        let position: Position = serde_json::from_str(json).unwrap();
        assert_eq!(position.unrealized_pnl, Some(-3.5));
        assert_eq!(position.side, None);
        assert!(position.is_open());
    }
}
