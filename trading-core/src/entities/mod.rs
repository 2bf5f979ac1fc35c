mod portfolio;
mod position;
mod signal;
mod trade;

pub use portfolio::PortfolioSummary;
pub use position::{ExitReason, Position, PositionSide, PositionStatus};
pub use signal::SignalEvent;
pub use trade::{Trade, TradeType};
