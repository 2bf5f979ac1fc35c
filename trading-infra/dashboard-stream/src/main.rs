use anyhow::Result;
use dashboard_stream::{
    ConnectionState, StreamClient, SubscriptionHandler, load_config, load_default_config,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use trading_core::{PortfolioSummary, SignalEvent, Trade};

use dashboard_stream::domain::{
    FundingUpdate, OpenInterestUpdate, PositionEvent, PriceCandle, PriceHistory,
};

/// Logs everything a named subscription receives
struct LogHandler {
    name: String,
}

impl SubscriptionHandler for LogHandler {
    fn on_trade(&self, trade: &Trade) {
        info!(
            sub = %self.name,
            id = trade.id,
            instrument = %trade.starlisting_id,
            trade_type = ?trade.trade_type,
            price = trade.price,
            size = trade.size,
            "trade"
        );
    }

    fn on_position(&self, event: &PositionEvent) {
        info!(
            sub = %self.name,
            id = event.position.id,
            kind = ?event.kind,
            unrealized_pnl = ?event.position.unrealized_pnl,
            "position"
        );
    }

    fn on_portfolio(&self, summary: &PortfolioSummary) {
        info!(
            sub = %self.name,
            total_capital = summary.total_capital_usd,
            total_pnl = summary.total_pnl_usd,
            "portfolio"
        );
    }

    fn on_price_history(&self, history: &PriceHistory) {
        info!(
            sub = %self.name,
            instrument = %history.starlisting_id,
            candles = history.candles.len(),
            first = ?history.candles.first().map(|c| c.time),
            last = ?history.candles.last().map(|c| c.time),
            "price history"
        );
    }

    fn on_price_candle(&self, update: &PriceCandle) {
        info!(
            sub = %self.name,
            instrument = %update.starlisting_id,
            time = update.candle.time,
            close = update.candle.close,
            "candle"
        );
    }

    fn on_funding_update(&self, update: &FundingUpdate) {
        info!(
            sub = %self.name,
            instrument = %update.starlisting_id,
            time = update.rate.time,
            rate = update.rate.funding_rate,
            "funding"
        );
    }

    fn on_open_interest_update(&self, update: &OpenInterestUpdate) {
        info!(
            sub = %self.name,
            instrument = %update.starlisting_id,
            time = update.point.time,
            open_interest = update.point.open_interest,
            "open interest"
        );
    }

    fn on_signal(&self, signal: &SignalEvent) {
        info!(
            sub = %self.name,
            strategy = ?signal.strategy_id,
            instrument = ?signal.starlisting_id,
            "signal"
        );
    }

    fn on_connection_change(&self, connected: bool) {
        info!(sub = %self.name, connected, "connection changed");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("dashboard_stream=info".parse()?))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => load_config(&path)?,
        None => load_default_config()?,
    };
    info!(
        url = %config.stream.url,
        subscriptions = config.subscriptions.len(),
        "Starting dashboard stream"
    );

    let client = StreamClient::websocket(config.stream.clone());

    let mut state = client.controller().watch_state();
    tokio::spawn(async move {
        while state.changed().await.is_ok() {
            let current: ConnectionState = *state.borrow_and_update();
            info!(state = %current, "Stream state");
        }
    });

    let subscriptions: Vec<_> = config
        .subscriptions
        .into_iter()
        .map(|sub| {
            let handler = Arc::new(LogHandler {
                name: sub.name.clone(),
            });
            info!(name = %sub.name, channels = ?sub.request.channels, "Opening subscription");
            client.subscribe(sub.request, handler)
        })
        .collect();

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    drop(subscriptions);
    client.shutdown();
    Ok(())
}
