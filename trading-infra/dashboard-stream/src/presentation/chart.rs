//! Chart feed
//!
//! Adapts normalized stream messages to an opaque charting sink. The sink
//! receives time-sorted points only; rendering is its own business.

use parking_lot::Mutex;
use trading_core::{
    Candle, EpochSeconds, FundingRate, OpenInterestPoint, TimePoint, Trade, TradeType,
    sort_by_time,
};

use crate::application::SubscriptionHandler;
use crate::domain::{
    FundingHistory, FundingUpdate, OpenInterestHistory, OpenInterestUpdate, PriceCandle,
    PriceHistory,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChartPoint {
    Candle(Candle),
    Funding(FundingRate),
    OpenInterest(OpenInterestPoint),
}

impl TimePoint for ChartPoint {
    fn time(&self) -> EpochSeconds {
        match self {
            ChartPoint::Candle(c) => c.time,
            ChartPoint::Funding(f) => f.time,
            ChartPoint::OpenInterest(p) => p.time,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerPosition {
    BelowBar,
    AboveBar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    ArrowUp,
    ArrowDown,
}

/// Trade annotation on the price series
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeMarker {
    pub time: EpochSeconds,
    pub position: MarkerPosition,
    pub shape: MarkerShape,
    /// Long trades are drawn green, short trades red
    pub long: bool,
    pub text: String,
}

impl TradeMarker {
    pub fn from_trade(trade: &Trade) -> Self {
        let open = trade.trade_type.is_open();
        let long = trade.trade_type.is_long();
        let text = match trade.trade_type {
            TradeType::OpenLong => "Open Long",
            TradeType::OpenShort => "Open Short",
            TradeType::CloseLong => "Close Long",
            TradeType::CloseShort => "Close Short",
        };

        TradeMarker {
            time: trade.timestamp,
            position: if open {
                MarkerPosition::BelowBar
            } else {
                MarkerPosition::AboveBar
            },
            shape: if open {
                MarkerShape::ArrowUp
            } else {
                MarkerShape::ArrowDown
            },
            long,
            text: text.to_string(),
        }
    }
}

impl TimePoint for TradeMarker {
    fn time(&self) -> EpochSeconds {
        self.time
    }
}

/// Port implemented by the charting widget
pub trait ChartSink: Send {
    /// Replace a series with `points` (ascending by time)
    fn set_data(&mut self, points: &[ChartPoint]);
    /// Append or overwrite the point at its time
    fn update(&mut self, point: ChartPoint);
    /// Replace all markers (ascending by time)
    fn set_markers(&mut self, markers: &[TradeMarker]);
}

/// Markers kept by default; the oldest are dropped beyond this
pub const DEFAULT_MARKER_CAPACITY: usize = 500;

/// [`SubscriptionHandler`] that drives a [`ChartSink`]
pub struct ChartFeed<S: ChartSink> {
    sink: Mutex<S>,
    markers: Mutex<Vec<TradeMarker>>,
    marker_capacity: usize,
}

impl<S: ChartSink> ChartFeed<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink: Mutex::new(sink),
            markers: Mutex::new(Vec::new()),
            marker_capacity: DEFAULT_MARKER_CAPACITY,
        }
    }

    pub fn with_marker_capacity(mut self, capacity: usize) -> Self {
        self.marker_capacity = capacity;
        self
    }

    /// Seed markers from trades fetched before the stream started
    pub fn with_trades(self, trades: &[Trade]) -> Self {
        {
            let mut markers = self.markers.lock();
            markers.extend(trades.iter().map(TradeMarker::from_trade));
            sort_by_time(&mut markers);
            trim_oldest(&mut markers, self.marker_capacity);
            self.sink.lock().set_markers(&markers);
        }
        self
    }

    pub fn with_sink<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.sink.lock())
    }

    pub fn into_sink(self) -> S {
        self.sink.into_inner()
    }

    fn set_data(&self, mut points: Vec<ChartPoint>) {
        sort_by_time(&mut points);
        self.sink.lock().set_data(&points);
    }
}

fn trim_oldest(markers: &mut Vec<TradeMarker>, capacity: usize) {
    if markers.len() > capacity {
        let excess = markers.len() - capacity;
        markers.drain(..excess);
    }
}

impl<S: ChartSink + 'static> SubscriptionHandler for ChartFeed<S> {
    fn on_trade(&self, trade: &Trade) {
        let marker = TradeMarker::from_trade(trade);
        let mut markers = self.markers.lock();
        let at = markers.partition_point(|m| m.time <= marker.time);
        markers.insert(at, marker);
        trim_oldest(&mut markers, self.marker_capacity);
        self.sink.lock().set_markers(&markers);
    }

    fn on_price_history(&self, history: &PriceHistory) {
        self.set_data(history.candles.iter().copied().map(ChartPoint::Candle).collect());
    }

    fn on_price_candle(&self, update: &PriceCandle) {
        self.sink.lock().update(ChartPoint::Candle(update.candle));
    }

    fn on_funding_history(&self, history: &FundingHistory) {
        self.set_data(history.rates.iter().copied().map(ChartPoint::Funding).collect());
    }

    fn on_funding_update(&self, update: &FundingUpdate) {
        self.sink.lock().update(ChartPoint::Funding(update.rate));
    }

    fn on_open_interest_history(&self, history: &OpenInterestHistory) {
        self.set_data(
            history
                .points
                .iter()
                .copied()
                .map(ChartPoint::OpenInterest)
                .collect(),
        );
    }

    fn on_open_interest_update(&self, update: &OpenInterestUpdate) {
        self.sink.lock().update(ChartPoint::OpenInterest(update.point));
    }
}
