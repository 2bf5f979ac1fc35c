use serde::{Deserialize, Serialize};

/// Portfolio-wide capital and PnL summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioSummary {
    pub initial_capital_usd: f64,
    pub total_capital_usd: f64,
    pub available_capital_usd: f64,
    pub allocated_capital_usd: f64,
    pub total_pnl_usd: f64,
    pub total_pnl_pct: f64,
    pub realized_pnl_usd: f64,
    pub unrealized_pnl_usd: f64,
    pub open_positions: u64,
    pub total_positions: u64,
    pub total_trades: u64,
    pub active_strategies: u64,
}

impl PortfolioSummary {
    /// Share of total capital currently allocated to positions
    pub fn utilization(&self) -> Option<f64> {
        if self.total_capital_usd == 0.0 {
            return None;
        }
        Some(self.allocated_capital_usd / self.total_capital_usd)
    }
}
