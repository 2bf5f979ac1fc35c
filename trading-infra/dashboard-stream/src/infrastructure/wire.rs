//! Inbound wire shapes
//!
//! These mirror the server's JSON exactly. Times are kept as [`WireTime`] here
//! and converted once in the `into_*` methods.

use serde::Deserialize;
use serde_json::Value;
use trading_core::{Candle, FundingRate, InstrumentId, OpenInterestPoint, TimeError, WireTime};

#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Deserialize)]
pub struct RawCandle {
    pub time: WireTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: Option<f64>,
}

impl RawCandle {
    pub fn into_candle(self) -> Result<Candle, TimeError> {
        Ok(Candle {
            time: self.time.to_epoch_seconds()?,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RawPriceHistory {
    pub starlisting_id: InstrumentId,
    #[serde(default)]
    pub coin: Option<String>,
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub candles: Vec<RawCandle>,
}

/// `price.candle` carries the candle fields inline next to the routing fields
#[derive(Debug, Deserialize)]
pub struct RawPriceCandle {
    pub starlisting_id: InstrumentId,
    #[serde(default)]
    pub coin: Option<String>,
    #[serde(default)]
    pub interval: Option<String>,
    pub time: WireTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: Option<f64>,
}

impl RawPriceCandle {
    pub fn candle(&self) -> Result<Candle, TimeError> {
        Ok(Candle {
            time: self.time.to_epoch_seconds()?,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RawFundingPoint {
    pub time: WireTime,
    pub funding_rate: f64,
    #[serde(default)]
    pub mark_price: Option<f64>,
}

impl RawFundingPoint {
    pub fn into_rate(self) -> Result<FundingRate, TimeError> {
        Ok(FundingRate {
            time: self.time.to_epoch_seconds()?,
            funding_rate: self.funding_rate,
            mark_price: self.mark_price,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RawFundingHistory {
    pub starlisting_id: InstrumentId,
    #[serde(default)]
    pub coin: Option<String>,
    #[serde(default)]
    pub funding_rates: Vec<RawFundingPoint>,
}

#[derive(Debug, Deserialize)]
pub struct RawFundingUpdate {
    pub starlisting_id: InstrumentId,
    #[serde(flatten)]
    pub point: RawFundingPoint,
}

#[derive(Debug, Deserialize)]
pub struct RawOpenInterestPoint {
    pub time: WireTime,
    pub open_interest: f64,
    #[serde(default)]
    pub notional_value: Option<f64>,
}

impl RawOpenInterestPoint {
    pub fn into_point(self) -> Result<OpenInterestPoint, TimeError> {
        Ok(OpenInterestPoint {
            time: self.time.to_epoch_seconds()?,
            open_interest: self.open_interest,
            notional_value: self.notional_value,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RawOpenInterestHistory {
    pub starlisting_id: InstrumentId,
    #[serde(default)]
    pub coin: Option<String>,
    #[serde(default)]
    pub open_interest: Vec<RawOpenInterestPoint>,
}

#[derive(Debug, Deserialize)]
pub struct RawOpenInterestUpdate {
    pub starlisting_id: InstrumentId,
    #[serde(flatten)]
    pub point: RawOpenInterestPoint,
}
