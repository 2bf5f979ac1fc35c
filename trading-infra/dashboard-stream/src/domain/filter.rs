use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use trading_core::{InstrumentId, StrategyId};

/// One subscriber's filter request for a channel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDelta {
    #[serde(default)]
    pub instrument_ids: BTreeSet<InstrumentId>,
    #[serde(default)]
    pub strategy_id: Option<StrategyId>,
    #[serde(default)]
    pub history: Option<u32>,
}

impl FilterDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instruments<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<InstrumentId>,
    {
        self.instrument_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_strategy(mut self, strategy_id: impl Into<StrategyId>) -> Self {
        self.strategy_id = Some(strategy_id.into());
        self
    }

    pub fn with_history(mut self, depth: u32) -> Self {
        self.history = Some(depth);
        self
    }
}

/// Merged filter state of every subscriber interested in one channel.
///
/// Merging only ever widens: instrument ids are unioned, the strategy id is
/// last-writer-wins and the history depth keeps the maximum requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelFilterState {
    /// Empty means "no instrument filter"
    pub instrument_ids: BTreeSet<InstrumentId>,
    pub strategy_id: Option<StrategyId>,
    pub history: Option<u32>,
}

impl ChannelFilterState {
    pub fn merge(&mut self, delta: &FilterDelta) {
        self.instrument_ids
            .extend(delta.instrument_ids.iter().copied());
        if delta.strategy_id.is_some() {
            self.strategy_id = delta.strategy_id;
        }
        self.history = match (self.history, delta.history) {
            (Some(current), Some(requested)) => Some(current.max(requested)),
            (current, requested) => current.or(requested),
        };
    }

    /// True when frames for `id` pass this filter
    pub fn accepts(&self, id: InstrumentId) -> bool {
        self.instrument_ids.is_empty() || self.instrument_ids.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_widens() {
        let mut state = ChannelFilterState::default();
        state.merge(&FilterDelta::new().with_instruments([5u64]).with_history(200));
        state.merge(&FilterDelta::new().with_instruments([5u64, 7]).with_history(100));

        assert_eq!(
            state.instrument_ids.iter().map(|i| i.0).collect::<Vec<_>>(),
            vec![5, 7]
        );
        assert_eq!(state.history, Some(200));
    }

    #[test]
    fn test_strategy_last_writer_wins_but_none_keeps() {
        let mut state = ChannelFilterState::default();
        state.merge(&FilterDelta::new().with_strategy(1u64));
        state.merge(&FilterDelta::new().with_strategy(2u64));
        state.merge(&FilterDelta::new());
        assert_eq!(state.strategy_id, Some(StrategyId(2)));
    }

    #[test]
    fn test_accepts() {
        let mut state = ChannelFilterState::default();
        assert!(state.accepts(InstrumentId(1)));

        state.merge(&FilterDelta::new().with_instruments([6u64]));
        assert!(state.accepts(InstrumentId(6)));
        assert!(!state.accepts(InstrumentId(9)));
    }
}
