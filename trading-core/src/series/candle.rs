use serde::{Deserialize, Serialize};

use super::TimePoint;
use crate::value_objects::EpochSeconds;

/// OHLC candle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: EpochSeconds,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl Candle {
    pub fn new(time: EpochSeconds, open: f64, high: f64, low: f64, close: f64) -> Self {
        Candle {
            time,
            open,
            high,
            low,
            close,
            volume: None,
        }
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    /// True when the candle closed at or above its open
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }
}

impl TimePoint for Candle {
    fn time(&self) -> EpochSeconds {
        self.time
    }
}
