//! Concentration and diversification statistics.
//!
//! Inputs are holding weights in percent units (summing to 100 for a
//! valued portfolio). All measures are order-invariant.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::concentration_model::ConcentrationMetrics;

/// Compute HHI, effective holding count, Gini coefficient, and the Lorenz
/// curve from percent weights.
pub fn analyze(weights: &[Decimal]) -> ConcentrationMetrics {
    let hhi: Decimal = weights.iter().map(|w| w * w).sum();

    let effective_n = if hhi > Decimal::ZERO {
        dec!(10000) / hhi
    } else {
        Decimal::from(weights.len())
    };

    ConcentrationMetrics {
        hhi,
        effective_n,
        gini: gini(weights),
        lorenz_curve: lorenz_curve(weights),
    }
}

/// Sum of the `k` largest weights. When `k` covers every holding the
/// answer is the whole portfolio, reported as 100.
pub fn top_k_concentration(weights: &[Decimal], k: usize) -> Decimal {
    if weights.is_empty() {
        return Decimal::ZERO;
    }
    if k >= weights.len() {
        return dec!(100);
    }
    let mut sorted = weights.to_vec();
    sorted.sort_by(|a, b| b.cmp(a));
    sorted.iter().take(k).sum()
}

/// Gini coefficient over the weight distribution. Defined as 0 for a
/// single holding or a zero-weight portfolio.
fn gini(weights: &[Decimal]) -> Decimal {
    let n = weights.len();
    if n <= 1 {
        return Decimal::ZERO;
    }
    let total: Decimal = weights.iter().sum();
    if total.is_zero() {
        return Decimal::ZERO;
    }

    let mut sorted = weights.to_vec();
    sorted.sort();

    // Area under the Lorenz curve via midpoint-corrected cumulative sums.
    let mut cumulative = Decimal::ZERO;
    let mut area = Decimal::ZERO;
    for w in &sorted {
        cumulative += w;
        area += cumulative - w / dec!(2);
    }

    Decimal::ONE - dec!(2) * area / (Decimal::from(n) * total)
}

/// Descending-sorted cumulative weight as a function of rank.
fn lorenz_curve(weights: &[Decimal]) -> Vec<Decimal> {
    let mut sorted = weights.to_vec();
    sorted.sort_by(|a, b| b.cmp(a));

    let mut cumulative = Decimal::ZERO;
    sorted
        .iter()
        .map(|w| {
            cumulative += w;
            cumulative
        })
        .collect()
}
