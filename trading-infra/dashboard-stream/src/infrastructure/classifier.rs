use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::trace;
use trading_core::sort_by_time;

use super::wire::{
    Envelope, RawFundingHistory, RawFundingUpdate, RawOpenInterestHistory, RawOpenInterestUpdate,
    RawPriceCandle, RawPriceHistory,
};
use crate::domain::{
    FundingHistory, FundingUpdate, MessageKind, NormalizedMessage, OpenInterestHistory,
    OpenInterestUpdate, PositionEvent, PositionEventKind, PriceCandle, PriceHistory,
};
use crate::error::DecodeError;

/// Turns raw text frames into [`NormalizedMessage`]s.
///
/// Unknown `type` discriminators are not errors: they yield `Ok(None)` so new
/// server message kinds are ignored. A known discriminator with a payload that
/// does not decode is a [`DecodeError`].
#[derive(Debug, Default, Clone, Copy)]
pub struct MessageClassifier;

impl MessageClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, frame: &str) -> Result<Option<NormalizedMessage>, DecodeError> {
        let envelope: Envelope = serde_json::from_str(frame).map_err(DecodeError::Json)?;
        self.classify_envelope(envelope)
    }

    pub fn classify_envelope(
        &self,
        envelope: Envelope,
    ) -> Result<Option<NormalizedMessage>, DecodeError> {
        let Some(kind) = MessageKind::from_wire(&envelope.kind) else {
            trace!(
                kind = %envelope.kind,
                channel = ?envelope.channel,
                "Unclassified message type - ignoring"
            );
            return Ok(None);
        };

        let data = envelope.data;
        let message = match kind {
            MessageKind::TradeNew => NormalizedMessage::Trade(payload(kind, data)?),
            MessageKind::PositionOpened => position(kind, PositionEventKind::Opened, data)?,
            MessageKind::PositionClosed => position(kind, PositionEventKind::Closed, data)?,
            MessageKind::PositionPnlUpdate => position(kind, PositionEventKind::PnlUpdate, data)?,
            MessageKind::PortfolioUpdate => NormalizedMessage::Portfolio(payload(kind, data)?),
            MessageKind::SignalNew => NormalizedMessage::Signal(payload(kind, data)?),
            MessageKind::PriceHistorical => {
                let raw: RawPriceHistory = payload(kind, data)?;
                let mut candles = raw
                    .candles
                    .into_iter()
                    .map(|c| c.into_candle())
                    .collect::<Result<Vec<_>, _>>()?;
                sort_by_time(&mut candles);
                NormalizedMessage::PriceHistory(PriceHistory {
                    starlisting_id: raw.starlisting_id,
                    coin: raw.coin,
                    interval: raw.interval,
                    candles,
                })
            }
            MessageKind::PriceCandle => {
                let raw: RawPriceCandle = payload(kind, data)?;
                let candle = raw.candle()?;
                NormalizedMessage::PriceCandle(PriceCandle {
                    starlisting_id: raw.starlisting_id,
                    coin: raw.coin,
                    interval: raw.interval,
                    candle,
                })
            }
            MessageKind::FundingHistorical => {
                let raw: RawFundingHistory = payload(kind, data)?;
                let mut rates = raw
                    .funding_rates
                    .into_iter()
                    .map(|p| p.into_rate())
                    .collect::<Result<Vec<_>, _>>()?;
                sort_by_time(&mut rates);
                NormalizedMessage::FundingHistory(FundingHistory {
                    starlisting_id: raw.starlisting_id,
                    coin: raw.coin,
                    rates,
                })
            }
            MessageKind::FundingUpdate => {
                let raw: RawFundingUpdate = payload(kind, data)?;
                NormalizedMessage::FundingUpdate(FundingUpdate {
                    starlisting_id: raw.starlisting_id,
                    rate: raw.point.into_rate()?,
                })
            }
            MessageKind::OpenInterestHistorical => {
                let raw: RawOpenInterestHistory = payload(kind, data)?;
                let mut points = raw
                    .open_interest
                    .into_iter()
                    .map(|p| p.into_point())
                    .collect::<Result<Vec<_>, _>>()?;
                sort_by_time(&mut points);
                NormalizedMessage::OpenInterestHistory(OpenInterestHistory {
                    starlisting_id: raw.starlisting_id,
                    coin: raw.coin,
                    points,
                })
            }
            MessageKind::OpenInterestUpdate => {
                let raw: RawOpenInterestUpdate = payload(kind, data)?;
                NormalizedMessage::OpenInterestUpdate(OpenInterestUpdate {
                    starlisting_id: raw.starlisting_id,
                    point: raw.point.into_point()?,
                })
            }
        };

        Ok(Some(message))
    }
}

fn payload<T: DeserializeOwned>(kind: MessageKind, data: Value) -> Result<T, DecodeError> {
    serde_json::from_value(data).map_err(|source| DecodeError::Payload {
        kind: kind.as_str(),
        source,
    })
}

fn position(
    kind: MessageKind,
    event: PositionEventKind,
    data: Value,
) -> Result<NormalizedMessage, DecodeError> {
    Ok(NormalizedMessage::Position(PositionEvent {
        kind: event,
        position: payload(kind, data)?,
    }))
}
