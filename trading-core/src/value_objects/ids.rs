use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a listed instrument on a venue (a "starlisting" on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentId(pub u64);

impl InstrumentId {
    pub fn new(id: u64) -> Self {
        InstrumentId(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for InstrumentId {
    fn from(id: u64) -> Self {
        InstrumentId(id)
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a trading strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyId(pub u64);

impl StrategyId {
    pub fn new(id: u64) -> Self {
        StrategyId(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for StrategyId {
    fn from(id: u64) -> Self {
        StrategyId(id)
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_transparent_on_the_wire() {
        let ids: Vec<InstrumentId> = serde_json::from_str("[6, 9]").unwrap();
        assert_eq!(ids, vec![InstrumentId(6), InstrumentId(9)]);

        let json = serde_json::to_string(&StrategyId::new(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_instrument_ids_order_numerically() {
        let mut ids = vec![InstrumentId(9), InstrumentId(6), InstrumentId(12)];
        ids.sort();
        assert_eq!(ids, vec![InstrumentId(6), InstrumentId(9), InstrumentId(12)]);
    }
}
