use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::constants::{
    DECIMAL_PRECISION, MIN_BENCHMARK_OBSERVATIONS, MIN_RETURN_OBSERVATIONS, ROLLING_WINDOW_MAX,
    ROLLING_WINDOW_MIN, SQRT_TRADING_DAYS_APPROX, TRADING_DAYS_PER_YEAR,
};
use crate::errors::Result;
use crate::market_data::{MarketDataServiceTrait, PricePoint};
use crate::portfolio::holdings::Holding;

use super::performance_model::{
    AlignedReturns, BenchmarkMetrics, HoldingPeriodReturn, PerformanceMetrics, PerformanceReport,
    ReportPeriod, ReturnData, ValuePoint,
};

/// Time-series performance analytics over the portfolio value history.
///
/// [`analyze`](Self::analyze) is the orchestration: it fetches historical
/// closes for the holdings and the benchmark, builds the portfolio value
/// series, and derives the metrics bundle. The building blocks below it
/// are pure and individually testable. A stateless batch: nothing is
/// carried between invocations.
pub struct PerformanceService {
    market_data: Arc<dyn MarketDataServiceTrait>,
}

impl PerformanceService {
    pub fn new(market_data: Arc<dyn MarketDataServiceTrait>) -> Self {
        Self { market_data }
    }

    /// Run the full time-series analysis for one (period, benchmark)
    /// selection.
    pub async fn analyze(
        &self,
        holdings: &[Holding],
        benchmark_symbol: Option<&str>,
        period: ReportPeriod,
        risk_free_annual: Decimal,
        today: NaiveDate,
    ) -> Result<PerformanceReport> {
        let (start_date, end_date) = period.date_range(today);
        debug!(
            "Performance analysis over {}..{} for {} holdings (benchmark: {:?})",
            start_date,
            end_date,
            holdings.len(),
            benchmark_symbol
        );

        let symbols: Vec<String> = holdings
            .iter()
            .map(|h| h.symbol.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let (series_result, benchmark_result) = futures::join!(
            self.market_data
                .get_daily_close_series(&symbols, start_date, end_date),
            async {
                match benchmark_symbol {
                    Some(benchmark) => Some(
                        self.market_data
                            .get_daily_close_series(&[benchmark.to_string()], start_date, end_date)
                            .await,
                    ),
                    None => None,
                }
            }
        );

        let series_set = series_result?;
        let mut missing_symbols = series_set.missing.clone();

        let benchmark_returns: Option<Vec<ReturnData>> = match (benchmark_symbol, benchmark_result)
        {
            (Some(benchmark), Some(Ok(set))) => match set.series.get(benchmark) {
                Some(points) => Some(Self::returns_from_prices(points)),
                None => {
                    warn!("No benchmark history for {}", benchmark);
                    missing_symbols.push(benchmark.to_string());
                    None
                }
            },
            (Some(benchmark), Some(Err(e))) => {
                warn!("Benchmark fetch failed for {}: {}", benchmark, e);
                missing_symbols.push(benchmark.to_string());
                None
            }
            _ => None,
        };

        let value_series = Self::build_value_series(holdings, &series_set.series);
        let returns = Self::daily_returns(&value_series);

        let aligned = benchmark_returns
            .as_ref()
            .map(|bench| Self::align_returns(&returns, bench));

        let return_values: Vec<Decimal> = returns.iter().map(|r| r.value).collect();
        let metrics = Self::compute_metrics(&return_values, aligned.as_ref(), risk_free_annual);

        let drawdown_series = metrics
            .as_ref()
            .map(|m| {
                returns
                    .iter()
                    .zip(&m.drawdown)
                    .map(|(r, dd)| ReturnData {
                        date: r.date,
                        value: dd.round_dp(DECIMAL_PRECISION),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(PerformanceReport {
            period_start_date: value_series.first().map(|p| p.date),
            period_end_date: value_series.last().map(|p| p.date),
            holding_returns: Self::holding_period_returns(holdings, &series_set.series),
            value_series,
            returns,
            drawdown_series,
            metrics,
            missing_symbols,
        })
    }

    /// Build the portfolio value series over the union of instrument
    /// trading dates.
    ///
    /// A symbol missing a date is forward-filled from its last known
    /// close; dates before a symbol's first quote contribute zero for
    /// that symbol. Holdings without any history are skipped entirely.
    pub fn build_value_series(
        holdings: &[Holding],
        series: &HashMap<String, Vec<PricePoint>>,
    ) -> Vec<ValuePoint> {
        let mut dates: BTreeSet<NaiveDate> = BTreeSet::new();
        let mut held: Vec<(&Holding, &[PricePoint])> = Vec::new();
        for holding in holdings {
            if let Some(points) = series.get(&holding.symbol) {
                if !points.is_empty() {
                    held.push((holding, points));
                    dates.extend(points.iter().map(|p| p.date));
                }
            }
        }
        if held.is_empty() {
            return Vec::new();
        }

        let mut cursors = vec![0usize; held.len()];
        let mut last_close: Vec<Option<Decimal>> = vec![None; held.len()];
        let mut values = Vec::with_capacity(dates.len());

        for date in dates {
            let mut total = Decimal::ZERO;
            for (i, (holding, points)) in held.iter().enumerate() {
                while cursors[i] < points.len() && points[cursors[i]].date <= date {
                    last_close[i] = Some(points[cursors[i]].close);
                    cursors[i] += 1;
                }
                if let Some(close) = last_close[i] {
                    total += holding.quantity * close;
                }
            }
            values.push(ValuePoint { date, value: total });
        }

        values
    }

    /// Daily simple returns from consecutive portfolio values, defined
    /// for t >= 1. A zero previous value yields a zero return.
    pub fn daily_returns(values: &[ValuePoint]) -> Vec<ReturnData> {
        values
            .windows(2)
            .map(|w| ReturnData {
                date: w[1].date,
                value: if w[0].value.is_zero() {
                    Decimal::ZERO
                } else {
                    w[1].value / w[0].value - Decimal::ONE
                },
            })
            .collect()
    }

    /// Daily simple returns from a close series (used for the benchmark).
    pub fn returns_from_prices(points: &[PricePoint]) -> Vec<ReturnData> {
        points
            .windows(2)
            .map(|w| ReturnData {
                date: w[1].date,
                value: if w[0].close.is_zero() {
                    Decimal::ZERO
                } else {
                    w[1].close / w[0].close - Decimal::ONE
                },
            })
            .collect()
    }

    /// Inner join of portfolio and benchmark returns on date; unmatched
    /// dates are dropped from both sides.
    pub fn align_returns(portfolio: &[ReturnData], benchmark: &[ReturnData]) -> AlignedReturns {
        let mut aligned = AlignedReturns::default();
        let mut i = 0;
        let mut j = 0;
        while i < portfolio.len() && j < benchmark.len() {
            match portfolio[i].date.cmp(&benchmark[j].date) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    aligned.portfolio.push(portfolio[i].value);
                    aligned.benchmark.push(benchmark[j].value);
                    i += 1;
                    j += 1;
                }
            }
        }
        aligned
    }

    /// Compute the metrics bundle over a daily return series.
    ///
    /// Returns `None` when fewer than two observations exist; the bundle
    /// is all-or-nothing, never partially filled. Every ratio substitutes
    /// a neutral default for a degenerate denominator instead of failing.
    pub fn compute_metrics(
        returns: &[Decimal],
        benchmark: Option<&AlignedReturns>,
        risk_free_annual: Decimal,
    ) -> Option<PerformanceMetrics> {
        if returns.len() < MIN_RETURN_OBSERVATIONS {
            return None;
        }

        let n = returns.len();
        let count = Decimal::from(n);
        let rf_daily = risk_free_annual / Decimal::from(TRADING_DAYS_PER_YEAR);

        let total_return = compound_return(returns);
        let annualized_return = annualize_return(total_return, n);

        let daily_volatility = sample_stdev(returns);
        let annualized_volatility = daily_volatility * sqrt_trading_days();

        let drawdown = drawdown_series(returns);
        let max_drawdown = drawdown.iter().min().copied().unwrap_or(Decimal::ZERO);

        let sharpe_ratio = sharpe_of(returns, rf_daily);

        let mean_excess = mean(returns) - rf_daily;
        let negatives: Vec<Decimal> = returns.iter().filter(|r| **r < Decimal::ZERO).copied().collect();
        let downside = if negatives.is_empty() {
            daily_volatility
        } else {
            sample_stdev(&negatives)
        };
        let sortino_ratio = if downside.is_zero() {
            Decimal::ZERO
        } else {
            mean_excess / downside * sqrt_trading_days()
        };

        let calmar_ratio = if max_drawdown.is_zero() {
            Decimal::ZERO
        } else {
            annualized_return / max_drawdown.abs()
        };

        let mut sorted = returns.to_vec();
        sorted.sort();
        let var_95 = percentile(&sorted, dec!(5));
        let var_99 = percentile(&sorted, dec!(1));
        let tail: Vec<Decimal> = returns.iter().filter(|r| **r <= var_95).copied().collect();
        let cvar_95 = if tail.is_empty() { var_95 } else { mean(&tail) };

        let win_days = returns.iter().filter(|r| **r > Decimal::ZERO).count();
        let win_rate = Decimal::from(win_days) / count;
        let best_day = sorted.last().copied().unwrap_or(Decimal::ZERO);
        let worst_day = sorted.first().copied().unwrap_or(Decimal::ZERO);

        let positive_sum: Decimal = returns.iter().filter(|r| **r > Decimal::ZERO).sum();
        let negative_sum: Decimal = returns.iter().filter(|r| **r < Decimal::ZERO).sum();
        let profit_factor = if negative_sum.is_zero() {
            None
        } else {
            Some(positive_sum / negative_sum.abs())
        };

        let usable_benchmark =
            benchmark.filter(|aligned| aligned.len() >= MIN_BENCHMARK_OBSERVATIONS);
        if benchmark.is_some() && usable_benchmark.is_none() {
            debug!(
                "Benchmark dropped: fewer than {} aligned observations",
                MIN_BENCHMARK_OBSERVATIONS
            );
        }
        let benchmark_block =
            usable_benchmark.map(|aligned| benchmark_metrics(aligned, risk_free_annual));

        let rolling_window = rolling_window_size(n);
        let rolling_sharpe: Vec<Decimal> = if n >= rolling_window {
            returns
                .windows(rolling_window)
                .map(|window| sharpe_of(window, rf_daily))
                .collect()
        } else {
            Vec::new()
        };
        let rolling_beta: Vec<Decimal> = match usable_benchmark {
            Some(aligned) if aligned.len() >= rolling_window => (0..=aligned.len() - rolling_window)
                .map(|i| {
                    beta_of(
                        &aligned.portfolio[i..i + rolling_window],
                        &aligned.benchmark[i..i + rolling_window],
                    )
                })
                .collect(),
            _ => Vec::new(),
        };

        Some(PerformanceMetrics {
            total_return,
            annualized_return,
            daily_volatility,
            annualized_volatility,
            max_drawdown,
            sharpe_ratio,
            sortino_ratio,
            calmar_ratio,
            var_95,
            var_99,
            cvar_95,
            win_rate,
            best_day,
            worst_day,
            skewness: skewness(returns),
            kurtosis: excess_kurtosis(returns),
            profit_factor,
            drawdown,
            rolling_window,
            rolling_sharpe,
            rolling_beta,
            benchmark: benchmark_block,
        })
    }

    /// Period return of each holding over the fetched window. Holdings
    /// without usable start/end prices are skipped.
    pub fn holding_period_returns(
        holdings: &[Holding],
        series: &HashMap<String, Vec<PricePoint>>,
    ) -> Vec<HoldingPeriodReturn> {
        holdings
            .iter()
            .filter_map(|holding| {
                let points = series.get(&holding.symbol)?;
                let start_price = points.first()?.close;
                let end_price = points.last()?.close;
                if start_price <= Decimal::ZERO {
                    return None;
                }
                Some(HoldingPeriodReturn {
                    symbol: holding.symbol.clone(),
                    start_price,
                    end_price,
                    period_return_pct: (end_price - start_price) / start_price * dec!(100),
                })
            })
            .collect()
    }
}

// --- Statistics helpers ---

fn sqrt_trading_days() -> Decimal {
    Decimal::from(TRADING_DAYS_PER_YEAR)
        .sqrt()
        .unwrap_or(SQRT_TRADING_DAYS_APPROX)
}

fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    values.iter().sum::<Decimal>() / Decimal::from(values.len())
}

fn sample_variance(values: &[Decimal]) -> Decimal {
    if values.len() < 2 {
        return Decimal::ZERO;
    }
    let count = Decimal::from(values.len());
    let m = mean(values);
    let sum_squared_diff: Decimal = values
        .iter()
        .map(|&v| {
            let diff = v - m;
            diff * diff
        })
        .sum();
    sum_squared_diff / (count - Decimal::ONE)
}

fn sample_stdev(values: &[Decimal]) -> Decimal {
    let variance = sample_variance(values);
    if variance.is_sign_negative() {
        return Decimal::ZERO;
    }
    variance.sqrt().unwrap_or(Decimal::ZERO)
}

fn sample_covariance(a: &[Decimal], b: &[Decimal]) -> Decimal {
    let n = a.len().min(b.len());
    if n < 2 {
        return Decimal::ZERO;
    }
    let mean_a = mean(&a[..n]);
    let mean_b = mean(&b[..n]);
    let sum: Decimal = (0..n).map(|i| (a[i] - mean_a) * (b[i] - mean_b)).sum();
    sum / (Decimal::from(n) - Decimal::ONE)
}

fn compound_return(returns: &[Decimal]) -> Decimal {
    returns
        .iter()
        .fold(Decimal::ONE, |acc, r| acc * (Decimal::ONE + r))
        - Decimal::ONE
}

/// Annualize a compounded return over `observations` trading days:
/// (1 + total)^(252 / n) - 1, capped at a full loss.
fn annualize_return(total_return: Decimal, observations: usize) -> Decimal {
    if observations == 0 {
        return Decimal::ZERO;
    }
    // A total return at or below -100% has no real annualization; cap it.
    if total_return <= dec!(-1.0) {
        return dec!(-1.0);
    }
    let base = Decimal::ONE + total_return;
    if base <= Decimal::ZERO {
        return dec!(-1.0);
    }
    let exponent = Decimal::from(TRADING_DAYS_PER_YEAR) / Decimal::from(observations);
    base.powd(exponent) - Decimal::ONE
}

fn drawdown_series(returns: &[Decimal]) -> Vec<Decimal> {
    let mut cumulative = Decimal::ONE;
    let mut peak = Decimal::ONE;
    returns
        .iter()
        .map(|r| {
            cumulative *= Decimal::ONE + r;
            peak = peak.max(cumulative);
            if peak.is_zero() {
                Decimal::ZERO
            } else {
                (cumulative - peak) / peak
            }
        })
        .collect()
}

fn sharpe_of(returns: &[Decimal], rf_daily: Decimal) -> Decimal {
    let vol = sample_stdev(returns);
    if vol.is_zero() {
        return Decimal::ZERO;
    }
    (mean(returns) - rf_daily) / vol * sqrt_trading_days()
}

fn beta_of(portfolio: &[Decimal], benchmark: &[Decimal]) -> Decimal {
    let benchmark_variance = sample_variance(benchmark);
    if benchmark_variance.is_zero() {
        return Decimal::ONE;
    }
    sample_covariance(portfolio, benchmark) / benchmark_variance
}

/// Empirical percentile with linear interpolation between order
/// statistics. `sorted` must be ascending and non-empty.
fn percentile(sorted: &[Decimal], pct: Decimal) -> Decimal {
    use num_traits::ToPrimitive;

    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = pct / dec!(100) * Decimal::from(n - 1);
    let lower = rank.floor();
    let lower_idx = lower.to_usize().unwrap_or(0).min(n - 1);
    if lower_idx + 1 >= n {
        return sorted[n - 1];
    }
    let fraction = rank - lower;
    sorted[lower_idx] + fraction * (sorted[lower_idx + 1] - sorted[lower_idx])
}

/// Adjusted Fisher-Pearson sample skewness. Zero below three
/// observations or for a constant series.
fn skewness(values: &[Decimal]) -> Decimal {
    let n = values.len();
    if n < 3 {
        return Decimal::ZERO;
    }
    let s = sample_stdev(values);
    if s.is_zero() {
        return Decimal::ZERO;
    }
    let m = mean(values);
    let count = Decimal::from(n);
    let sum_cubed: Decimal = values
        .iter()
        .map(|&v| {
            let z = (v - m) / s;
            z * z * z
        })
        .sum();
    count / ((count - Decimal::ONE) * (count - dec!(2))) * sum_cubed
}

/// Sample excess kurtosis (Fisher definition: normal = 0). Zero below
/// four observations or for a constant series.
fn excess_kurtosis(values: &[Decimal]) -> Decimal {
    let n = values.len();
    if n < 4 {
        return Decimal::ZERO;
    }
    let s = sample_stdev(values);
    if s.is_zero() {
        return Decimal::ZERO;
    }
    let m = mean(values);
    let count = Decimal::from(n);
    let sum_fourth: Decimal = values
        .iter()
        .map(|&v| {
            let z = (v - m) / s;
            z * z * z * z
        })
        .sum();
    let one = Decimal::ONE;
    let adjustment =
        dec!(3) * (count - one) * (count - one) / ((count - dec!(2)) * (count - dec!(3)));
    count * (count + one) / ((count - one) * (count - dec!(2)) * (count - dec!(3))) * sum_fourth
        - adjustment
}

fn rolling_window_size(observations: usize) -> usize {
    (observations / 3)
        .max(ROLLING_WINDOW_MIN)
        .min(ROLLING_WINDOW_MAX)
}

fn benchmark_metrics(aligned: &AlignedReturns, risk_free_annual: Decimal) -> BenchmarkMetrics {
    let portfolio = &aligned.portfolio;
    let benchmark = &aligned.benchmark;
    let n = aligned.len();

    let beta = beta_of(portfolio, benchmark);

    let portfolio_cagr = annualize_return(compound_return(portfolio), n);
    let benchmark_cagr = annualize_return(compound_return(benchmark), n);

    let alpha = portfolio_cagr - (risk_free_annual + beta * (benchmark_cagr - risk_free_annual));

    let stdev_portfolio = sample_stdev(portfolio);
    let stdev_benchmark = sample_stdev(benchmark);
    let correlation = if stdev_portfolio.is_zero() || stdev_benchmark.is_zero() {
        Decimal::ZERO
    } else {
        sample_covariance(portfolio, benchmark) / (stdev_portfolio * stdev_benchmark)
    };

    let differences: Vec<Decimal> = (0..n).map(|i| portfolio[i] - benchmark[i]).collect();
    let tracking_error = sample_stdev(&differences) * sqrt_trading_days();

    let information_ratio = if tracking_error.is_zero() {
        Decimal::ZERO
    } else {
        (portfolio_cagr - benchmark_cagr) / tracking_error
    };

    let treynor_ratio = if beta.is_zero() {
        Decimal::ZERO
    } else {
        (portfolio_cagr - risk_free_annual) / beta
    };

    BenchmarkMetrics {
        beta,
        alpha,
        correlation,
        r_squared: correlation * correlation,
        tracking_error,
        information_ratio,
        treynor_ratio,
        up_capture: capture_ratio(aligned, true),
        down_capture: capture_ratio(aligned, false),
    }
}

/// Compounded portfolio growth over benchmark-up (or -down) days as a
/// percentage of the benchmark's own growth over the same days. 100 when
/// no qualifying days exist.
fn capture_ratio(aligned: &AlignedReturns, up: bool) -> Decimal {
    let mut portfolio_growth = Decimal::ONE;
    let mut benchmark_growth = Decimal::ONE;
    let mut qualifying_days = 0usize;

    for (p, b) in aligned.portfolio.iter().zip(&aligned.benchmark) {
        let qualifies = if up {
            *b > Decimal::ZERO
        } else {
            *b < Decimal::ZERO
        };
        if qualifies {
            portfolio_growth *= Decimal::ONE + p;
            benchmark_growth *= Decimal::ONE + b;
            qualifying_days += 1;
        }
    }

    if qualifying_days == 0 || benchmark_growth.is_zero() {
        return dec!(100);
    }
    portfolio_growth / benchmark_growth * dec!(100)
}
