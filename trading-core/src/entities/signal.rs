use serde::Deserialize;
use serde_json::{Map, Value};

use crate::time::serde_helpers::option_epoch_millis;
use crate::value_objects::{EpochSeconds, InstrumentId, StrategyId};

/// Strategy signal. Only the routing fields are typed; the model-specific
/// remainder is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SignalEvent {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub strategy_id: Option<StrategyId>,
    #[serde(default)]
    pub starlisting_id: Option<InstrumentId>,
    #[serde(default, deserialize_with = "option_epoch_millis")]
    pub timestamp: Option<EpochSeconds>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_keeps_extra_fields() {
        let json = r#"{"id": 1, "strategy_id": 4, "starlisting_id": 6, "timestamp": 1704067200000, "direction": "long", "confidence": 0.8}"#;
        let signal: SignalEvent = serde_json::from_str(json).unwrap();
        assert_eq!(signal.strategy_id, Some(StrategyId(4)));
        assert_eq!(signal.timestamp, Some(1_704_067_200));
        assert_eq!(signal.fields.get("direction"), Some(&Value::from("long")));
        assert!(!signal.fields.contains_key("id"));
    }
}
