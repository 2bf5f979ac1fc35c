//! Chart-ready time series points
//!
//! Every point carries its time in [`EpochSeconds`]. Sequences handed to a
//! consumer are sorted ascending by time with [`sort_by_time`]; duplicate
//! timestamps are kept in arrival order and left for the sink to resolve.

mod candle;
mod funding;
mod open_interest;

pub use candle::Candle;
pub use funding::FundingRate;
pub use open_interest::OpenInterestPoint;

use crate::value_objects::EpochSeconds;

/// A value positioned on the time axis
pub trait TimePoint {
    fn time(&self) -> EpochSeconds;
}

/// Stable ascending sort by time
pub fn sort_by_time<P: TimePoint>(points: &mut [P]) {
    points.sort_by_key(|p| p.time());
}

/// Check the ordering invariant (non-decreasing time)
pub fn is_time_ordered<P: TimePoint>(points: &[P]) -> bool {
    points.windows(2).all(|w| w[0].time() <= w[1].time())
}
