//! Per-consumer subscription façade
//!
//! [`StreamClient`] is the composition root: build one per application and
//! hand it to the components that need live data. Each
//! [`StreamClient::subscribe`] call returns a [`Subscription`] that releases
//! its interest when closed or dropped.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;
use trading_core::{InstrumentId, PortfolioSummary, SignalEvent, StrategyId, Trade};

use super::controller::ConnectionController;
use super::listeners::ListenerHandle;
use crate::config::StreamConfig;
use crate::domain::{
    Channel, FilterDelta, FundingHistory, FundingUpdate, NormalizedMessage, OpenInterestHistory,
    OpenInterestUpdate, PositionEvent, PriceCandle, PriceHistory, Transport,
};
use crate::infrastructure::WsTransport;

/// What a consumer wants to receive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    pub channels: Vec<Channel>,
    /// Empty means every instrument
    #[serde(default)]
    pub instrument_ids: BTreeSet<InstrumentId>,
    #[serde(default)]
    pub strategy_id: Option<StrategyId>,
    #[serde(default)]
    pub history: Option<u32>,
}

impl SubscriptionRequest {
    pub fn new(channels: impl IntoIterator<Item = Channel>) -> Self {
        let mut unique = Vec::new();
        for channel in channels {
            if !unique.contains(&channel) {
                unique.push(channel);
            }
        }
        Self {
            channels: unique,
            ..Default::default()
        }
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

    pub fn filter_delta(&self) -> FilterDelta {
        FilterDelta {
            instrument_ids: self.instrument_ids.clone(),
            strategy_id: self.strategy_id,
            history: self.history,
        }
    }

    /// Channel membership plus the declared instrument filter. A `prices`
    /// subscription also takes funding and open-interest messages. Messages
    /// that name no instrument pass the instrument check.
    pub fn accepts(&self, message: &NormalizedMessage) -> bool {
        let channel = message.channel();
        if !self.channels.iter().any(|c| c.carries(channel)) {
            return false;
        }
        match message.instrument_id() {
            Some(id) if !self.instrument_ids.is_empty() => self.instrument_ids.contains(&id),
            _ => true,
        }
    }
}

/// Typed callbacks for one subscription. Every method defaults to a no-op.
pub trait SubscriptionHandler: Send + Sync {
    fn on_trade(&self, _trade: &Trade) {}
    fn on_position(&self, _event: &PositionEvent) {}
    fn on_portfolio(&self, _summary: &PortfolioSummary) {}
    fn on_price_history(&self, _history: &PriceHistory) {}
    fn on_price_candle(&self, _update: &PriceCandle) {}
    fn on_funding_history(&self, _history: &FundingHistory) {}
    fn on_funding_update(&self, _update: &FundingUpdate) {}
    fn on_open_interest_history(&self, _history: &OpenInterestHistory) {}
    fn on_open_interest_update(&self, _update: &OpenInterestUpdate) {}
    fn on_signal(&self, _signal: &SignalEvent) {}
    fn on_connection_change(&self, _connected: bool) {}
}

/// Route a message to the matching typed callback
pub fn deliver(handler: &dyn SubscriptionHandler, message: &NormalizedMessage) {
    match message {
        NormalizedMessage::Trade(trade) => handler.on_trade(trade),
        NormalizedMessage::Position(event) => handler.on_position(event),
        NormalizedMessage::Portfolio(summary) => handler.on_portfolio(summary),
        NormalizedMessage::PriceHistory(history) => handler.on_price_history(history),
        NormalizedMessage::PriceCandle(update) => handler.on_price_candle(update),
        NormalizedMessage::FundingHistory(history) => handler.on_funding_history(history),
        NormalizedMessage::FundingUpdate(update) => handler.on_funding_update(update),
        NormalizedMessage::OpenInterestHistory(history) => {
            handler.on_open_interest_history(history)
        }
        NormalizedMessage::OpenInterestUpdate(update) => handler.on_open_interest_update(update),
        NormalizedMessage::Signal(signal) => handler.on_signal(signal),
    }
}

type InterestCounts = Arc<Mutex<HashMap<Channel, usize>>>;

pub struct StreamClient {
    controller: Arc<ConnectionController>,
    interest: InterestCounts,
}

impl StreamClient {
    pub fn new(config: StreamConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            controller: ConnectionController::new(config, transport),
            interest: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Client over a WebSocket transport built from `config`
    pub fn websocket(config: StreamConfig) -> Self {
        let transport = WsTransport::new(config.url.clone())
            .with_connect_timeout(config.connect_timeout())
            .with_inbound_buffer(config.inbound_buffer);
        Self::new(config, Arc::new(transport))
    }

    pub fn controller(&self) -> &Arc<ConnectionController> {
        &self.controller
    }

    /// Number of live subscriptions that include `channel`
    pub fn consumer_count(&self, channel: Channel) -> usize {
        self.interest.lock().get(&channel).copied().unwrap_or(0)
    }

    /// Register `handler` for `request` and make sure the connection is up.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn subscribe<H>(&self, request: SubscriptionRequest, handler: Arc<H>) -> Subscription
    where
        H: SubscriptionHandler + 'static,
    {
        let hub = self.controller.hub();
        let filter = request.clone();
        let on_message = Arc::clone(&handler);
        let on_open = Arc::clone(&handler);
        let on_close = handler;

        let handles = vec![
            hub.add_message_listener(move |message| {
                if filter.accepts(message) {
                    deliver(on_message.as_ref(), message);
                }
            }),
            hub.add_open_listener(move || on_open.on_connection_change(true)),
            hub.add_close_listener(move |_| on_close.on_connection_change(false)),
        ];

        {
            let mut counts = self.interest.lock();
            for channel in &request.channels {
                *counts.entry(*channel).or_insert(0) += 1;
            }
            self.controller.connect();
            self.controller
                .subscribe(&request.channels, &request.filter_delta());
        }

        debug!(channels = ?request.channels, "Subscription registered");
        Subscription {
            active: Some(Active {
                controller: Arc::clone(&self.controller),
                interest: Arc::clone(&self.interest),
                channels: request.channels,
                handles,
            }),
        }
    }

    /// Intentional disconnect; live subscriptions keep their registrations
    pub fn shutdown(&self) {
        self.controller.disconnect();
    }
}

struct Active {
    controller: Arc<ConnectionController>,
    interest: InterestCounts,
    channels: Vec<Channel>,
    handles: Vec<ListenerHandle>,
}

/// Live interest in a set of channels. Released on [`Subscription::close`] or
/// drop, whichever comes first.
pub struct Subscription {
    active: Option<Active>,
}

impl Subscription {
    pub fn channels(&self) -> &[Channel] {
        self.active
            .as_ref()
            .map(|a| a.channels.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        for handle in &active.handles {
            handle.remove();
        }

        let mut counts = active.interest.lock();
        let mut released = Vec::new();
        for channel in &active.channels {
            if let Some(count) = counts.get_mut(channel) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    counts.remove(channel);
                    released.push(*channel);
                }
            }
        }
        if !released.is_empty() {
            debug!(channels = ?released, "Last consumer gone, unsubscribing");
            active.controller.unsubscribe(&released);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
