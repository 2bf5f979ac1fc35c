use serde::{Deserialize, Serialize};

use super::TimePoint;
use crate::value_objects::EpochSeconds;

/// Perpetual funding rate sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FundingRate {
    pub time: EpochSeconds,
    pub funding_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mark_price: Option<f64>,
}

impl FundingRate {
    pub fn new(time: EpochSeconds, funding_rate: f64) -> Self {
        FundingRate {
            time,
            funding_rate,
            mark_price: None,
        }
    }

    pub fn with_mark_price(mut self, mark_price: f64) -> Self {
        self.mark_price = Some(mark_price);
        self
    }

    /// Rate expressed in percent, as charts display it
    pub fn rate_pct(&self) -> f64 {
        self.funding_rate * 100.0
    }
}

impl TimePoint for FundingRate {
    fn time(&self) -> EpochSeconds {
        self.time
    }
}
