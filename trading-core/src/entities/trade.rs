use serde::{Deserialize, Serialize};

use crate::time::serde_helpers::{epoch_millis, option_epoch_millis};
use crate::value_objects::{EpochSeconds, InstrumentId, StrategyId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeType {
    OpenLong,
    OpenShort,
    CloseLong,
    CloseShort,
}

impl TradeType {
    pub fn is_open(&self) -> bool {
        matches!(self, TradeType::OpenLong | TradeType::OpenShort)
    }

    pub fn is_long(&self) -> bool {
        matches!(self, TradeType::OpenLong | TradeType::CloseLong)
    }
}

/// An executed fill reported by the platform.
///
/// `timestamp` and `created_at` arrive as epoch milliseconds and are stored in
/// epoch seconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Trade {
    pub id: u64,
    #[serde(default)]
    pub position_id: Option<u64>,
    pub strategy_id: StrategyId,
    pub starlisting_id: InstrumentId,
    pub trade_type: TradeType,
    pub size: f64,
    pub price: f64,
    #[serde(default)]
    pub fees: f64,
    #[serde(default)]
    pub slippage: f64,
    #[serde(deserialize_with = "epoch_millis")]
    pub timestamp: EpochSeconds,
    #[serde(default)]
    pub signal_id: Option<u64>,
    #[serde(default, deserialize_with = "option_epoch_millis")]
    pub created_at: Option<EpochSeconds>,
    #[serde(default)]
    pub strategy_name: Option<String>,
    #[serde(default)]
    pub position_side: Option<String>,
}

impl Trade {
    pub fn notional(&self) -> f64 {
        self.size * self.price
    }
}
