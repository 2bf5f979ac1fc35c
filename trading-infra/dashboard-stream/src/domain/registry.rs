//! Per-channel merged filter state
//!
//! The registry is merge-only: it never narrows a channel's filter on its own.
//! Callers (the subscription façade) decide when a channel has no remaining
//! consumers and call [`ChannelRegistry::remove`].

use std::collections::{BTreeMap, BTreeSet};

use trading_core::{InstrumentId, StrategyId};

use super::channel::Channel;
use super::directive::{Directive, DirectiveFilters};
use super::filter::{ChannelFilterState, FilterDelta};

#[derive(Debug, Clone, Default)]
pub struct ChannelRegistry {
    entries: BTreeMap<Channel, ChannelFilterState>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one subscriber's request into the channel's merged state
    pub fn merge(&mut self, channel: Channel, delta: &FilterDelta) {
        self.entries.entry(channel).or_default().merge(delta);
    }

    pub fn remove(&mut self, channel: Channel) -> Option<ChannelFilterState> {
        self.entries.remove(&channel)
    }

    pub fn get(&self, channel: Channel) -> Option<&ChannelFilterState> {
        self.entries.get(&channel)
    }

    pub fn contains(&self, channel: Channel) -> bool {
        self.entries.contains_key(&channel)
    }

    pub fn channels(&self) -> Vec<Channel> {
        self.entries.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One combined subscribe directive for the registered subset of `channels`.
    ///
    /// Instrument ids are unioned, history is the maximum and the strategy is
    /// taken from the last channel (in `channels` order) that has one.
    pub fn snapshot_for(&self, channels: &[Channel]) -> Option<Directive> {
        let mut selected = Vec::new();
        let mut instruments = BTreeSet::new();
        let mut strategy: Option<StrategyId> = None;
        let mut history: Option<u32> = None;

        for channel in channels {
            let Some(state) = self.entries.get(channel) else {
                continue;
            };
            if selected.contains(channel) {
                continue;
            }
            selected.push(*channel);
            instruments.extend(state.instrument_ids.iter().copied());
            if state.strategy_id.is_some() {
                strategy = state.strategy_id;
            }
            history = history.max(state.history);
        }

        if selected.is_empty() {
            return None;
        }

        Some(build_subscribe(selected, &instruments, strategy, history))
    }

    /// Subscribe directives for the registered subset of `channels`, one per
    /// group of channels whose merged state is identical.
    ///
    /// Sending a channel with its own filters keeps an instrument filter on one
    /// channel from leaking into another.
    pub fn directives_for(&self, channels: &[Channel]) -> Vec<Directive> {
        let mut groups: Vec<(&ChannelFilterState, Vec<Channel>)> = Vec::new();

        for channel in channels {
            let Some(state) = self.entries.get(channel) else {
                continue;
            };
            if groups.iter().any(|(_, members)| members.contains(channel)) {
                continue;
            }
            match groups.iter_mut().find(|(s, _)| *s == state) {
                Some((_, members)) => members.push(*channel),
                None => groups.push((state, vec![*channel])),
            }
        }

        groups
            .into_iter()
            .map(|(state, members)| {
                build_subscribe(
                    members,
                    &state.instrument_ids,
                    state.strategy_id,
                    state.history,
                )
            })
            .collect()
    }

    /// Directives that rebuild the whole server-side state after a reconnect
    pub fn replay_directives(&self) -> Vec<Directive> {
        self.directives_for(&self.channels())
    }
}

fn build_subscribe(
    channels: Vec<Channel>,
    instruments: &BTreeSet<InstrumentId>,
    strategy: Option<StrategyId>,
    history: Option<u32>,
) -> Directive {
    Directive::Subscribe {
        channels,
        history,
        instrument_ids: instruments.iter().copied().collect(),
        filters: strategy.map(|strategy_id| DirectiveFilters { strategy_id }),
    }
}
