use serde::{Deserialize, Serialize};

use super::TimePoint;
use crate::value_objects::EpochSeconds;

/// Open interest sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpenInterestPoint {
    pub time: EpochSeconds,
    pub open_interest: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notional_value: Option<f64>,
}

impl OpenInterestPoint {
    pub fn new(time: EpochSeconds, open_interest: f64) -> Self {
        OpenInterestPoint {
            time,
            open_interest,
            notional_value: None,
        }
    }

    pub fn with_notional_value(mut self, notional_value: f64) -> Self {
        self.notional_value = Some(notional_value);
        self
    }
}

impl TimePoint for OpenInterestPoint {
    fn time(&self) -> EpochSeconds {
        self.time
    }
}
