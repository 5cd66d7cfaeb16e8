use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Portfolio-level totals at one instant, rolled up from the priced
/// holdings. Recomputed per analysis request, never persisted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub total_invested: Decimal,
    pub total_current_value: Decimal,
    pub total_gain: Decimal,
    /// total_gain / total_invested x 100, 0 when nothing is invested
    pub portfolio_return_pct: Decimal,
    pub today_change: Decimal,
    /// Ratio of aggregate day change to the previous aggregate value, NOT
    /// an average of per-holding day percentages.
    pub today_return_pct: Decimal,
    /// Sum of the N largest holding weights.
    pub top_n_concentration: Decimal,
    pub holding_count: usize,
}

/// Distribution statistics across the priced holdings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HoldingsStatistics {
    pub profitable_count: usize,
    pub losing_count: usize,
    /// Share of holdings currently in profit, percent.
    pub win_rate_pct: Decimal,
    pub average_gain_pct: Decimal,
    pub median_gain_pct: Decimal,
    pub average_weight: Decimal,
    pub max_weight: Decimal,
    pub min_weight: Decimal,
}
