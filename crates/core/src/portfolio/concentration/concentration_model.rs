use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Diversification statistics over the holding weights.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConcentrationMetrics {
    /// Herfindahl-Hirschman Index over percent weights; a single fully
    /// concentrated holding scores 10000.
    pub hhi: Decimal,
    /// Equivalent number of equally-weighted holdings (10000 / HHI).
    pub effective_n: Decimal,
    /// Inequality of the weight distribution: 0 equal, approaching 1 for a
    /// single dominant holding.
    pub gini: Decimal,
    /// Descending-sorted cumulative weight by rank, for the
    /// concentration-curve visualization.
    pub lorenz_curve: Vec<Decimal>,
}
