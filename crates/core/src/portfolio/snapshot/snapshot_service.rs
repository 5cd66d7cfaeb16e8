//! Portfolio-level aggregation over priced holdings.
//!
//! Percentages are ratios of sums, never averages of per-holding
//! percentages; every denominator is zero-guarded to a neutral default.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::portfolio::holdings::PricedHolding;

use super::snapshot_model::{HoldingsStatistics, PortfolioSnapshot};

/// Roll the priced holdings up into a portfolio snapshot.
pub fn snapshot(priced: &[PricedHolding], top_n: usize) -> PortfolioSnapshot {
    let total_invested: Decimal = priced.iter().map(|p| p.invested).sum();
    let total_current_value: Decimal = priced.iter().map(|p| p.current_value).sum();
    let total_gain: Decimal = priced.iter().map(|p| p.gain).sum();
    let today_change: Decimal = priced.iter().map(|p| p.today_change).sum();

    let portfolio_return_pct = if total_invested.is_zero() {
        Decimal::ZERO
    } else {
        total_gain / total_invested * dec!(100)
    };

    // Previous aggregate value backed out from today's change.
    let previous_value = total_current_value - today_change;
    let today_return_pct = if previous_value.is_zero() {
        Decimal::ZERO
    } else {
        today_change / previous_value * dec!(100)
    };

    PortfolioSnapshot {
        total_invested,
        total_current_value,
        total_gain,
        portfolio_return_pct,
        today_change,
        today_return_pct,
        top_n_concentration: top_n_concentration(priced, top_n),
        holding_count: priced.len(),
    }
}

/// Sum of the `n` largest holding weights. Ties keep input order (stable
/// sort).
pub fn top_n_concentration(priced: &[PricedHolding], n: usize) -> Decimal {
    let mut weights: Vec<Decimal> = priced.iter().map(|p| p.weight).collect();
    weights.sort_by(|a, b| b.cmp(a));
    weights.iter().take(n).sum()
}

/// Distribution statistics across the priced holdings.
pub fn statistics(priced: &[PricedHolding]) -> HoldingsStatistics {
    if priced.is_empty() {
        return HoldingsStatistics::default();
    }

    let count = Decimal::from(priced.len());
    let profitable_count = priced.iter().filter(|p| p.gain_pct > Decimal::ZERO).count();
    let losing_count = priced.iter().filter(|p| p.gain_pct < Decimal::ZERO).count();

    let gain_sum: Decimal = priced.iter().map(|p| p.gain_pct).sum();
    let weight_sum: Decimal = priced.iter().map(|p| p.weight).sum();

    let mut gains: Vec<Decimal> = priced.iter().map(|p| p.gain_pct).collect();
    gains.sort();
    let mid = gains.len() / 2;
    let median_gain_pct = if gains.len() % 2 == 1 {
        gains[mid]
    } else {
        (gains[mid - 1] + gains[mid]) / dec!(2)
    };

    let max_weight = priced
        .iter()
        .map(|p| p.weight)
        .max()
        .unwrap_or(Decimal::ZERO);
    let min_weight = priced
        .iter()
        .map(|p| p.weight)
        .min()
        .unwrap_or(Decimal::ZERO);

    HoldingsStatistics {
        profitable_count,
        losing_count,
        win_rate_pct: Decimal::from(profitable_count) / count * dec!(100),
        average_gain_pct: gain_sum / count,
        median_gain_pct,
        average_weight: weight_sum / count,
        max_weight,
        min_weight,
    }
}
