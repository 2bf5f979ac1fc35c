mod ids;

pub use ids::{InstrumentId, StrategyId};

/// Canonical time unit used by every normalized message: whole seconds since
/// the Unix epoch.
pub type EpochSeconds = i64;
