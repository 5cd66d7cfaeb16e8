use chrono::{Datelike, Duration, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One point of the portfolio value series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuePoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

/// One dated return (or drawdown) observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnData {
    pub date: NaiveDate,
    pub value: Decimal,
}

/// Portfolio and benchmark daily returns inner-joined by date; unmatched
/// dates are dropped. Both vectors have equal length.
#[derive(Debug, Clone, Default)]
pub struct AlignedReturns {
    pub portfolio: Vec<Decimal>,
    pub benchmark: Vec<Decimal>,
}

impl AlignedReturns {
    pub fn len(&self) -> usize {
        self.portfolio.len()
    }

    pub fn is_empty(&self) -> bool {
        self.portfolio.is_empty()
    }
}

/// Benchmark-relative statistics over the date-aligned return pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkMetrics {
    pub beta: Decimal,
    /// Annualized residual return over the CAPM expectation.
    pub alpha: Decimal,
    pub correlation: Decimal,
    pub r_squared: Decimal,
    pub tracking_error: Decimal,
    pub information_ratio: Decimal,
    pub treynor_ratio: Decimal,
    /// Compounded portfolio return over benchmark-positive days, as a
    /// percentage of the benchmark's own compounded return. 100 when no
    /// such days exist.
    pub up_capture: Decimal,
    pub down_capture: Decimal,
}

/// Return, risk, and distribution statistics over a daily return series.
///
/// A bundle only exists for two or more observations; callers receive
/// `None` otherwise and must treat every field as absent rather than zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    /// Compounded return over the whole period.
    pub total_return: Decimal,
    /// Total return annualized over 252 trading days.
    pub annualized_return: Decimal,
    pub daily_volatility: Decimal,
    pub annualized_volatility: Decimal,
    /// Most negative peak-to-trough decline; always <= 0.
    pub max_drawdown: Decimal,
    pub sharpe_ratio: Decimal,
    pub sortino_ratio: Decimal,
    pub calmar_ratio: Decimal,
    /// 5th percentile of the daily return distribution (signed).
    pub var_95: Decimal,
    /// 1st percentile of the daily return distribution (signed).
    pub var_99: Decimal,
    /// Mean of the returns at or below the 95% VaR threshold.
    pub cvar_95: Decimal,
    /// Fraction of days with a positive return.
    pub win_rate: Decimal,
    pub best_day: Decimal,
    pub worst_day: Decimal,
    pub skewness: Decimal,
    pub kurtosis: Decimal,
    /// Gross gains over gross losses; `None` when there are no losing
    /// days (the ratio is infinite).
    pub profit_factor: Option<Decimal>,
    /// Per-observation drawdown, index-aligned with the return series.
    pub drawdown: Vec<Decimal>,
    /// Trailing-window size used for the rolling series.
    pub rolling_window: usize,
    pub rolling_sharpe: Vec<Decimal>,
    pub rolling_beta: Vec<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<BenchmarkMetrics>,
}

/// Period return of one holding over the analysis window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingPeriodReturn {
    pub symbol: String,
    pub start_price: Decimal,
    pub end_price: Decimal,
    pub period_return_pct: Decimal,
}

/// Everything the analysis view needs for one (time range, benchmark)
/// selection: the underlying series for charting plus the metrics bundle.
#[derive(Debug, Clone, Default)]
pub struct PerformanceReport {
    pub period_start_date: Option<NaiveDate>,
    pub period_end_date: Option<NaiveDate>,
    pub value_series: Vec<ValuePoint>,
    pub returns: Vec<ReturnData>,
    pub drawdown_series: Vec<ReturnData>,
    pub metrics: Option<PerformanceMetrics>,
    pub holding_returns: Vec<HoldingPeriodReturn>,
    /// Symbols (including the benchmark) the provider had no data for.
    pub missing_symbols: Vec<String>,
}

/// Analysis time window, threaded explicitly into each compute call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportPeriod {
    OneWeek,
    OneMonth,
    ThreeMonths,
    SixMonths,
    YearToDate,
    OneYear,
    TwoYears,
    Max,
}

impl ReportPeriod {
    /// Resolve the period to a concrete [start, end] date range.
    pub fn date_range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = match self {
            ReportPeriod::OneWeek => today - Duration::days(7),
            ReportPeriod::OneMonth => sub_months(today, 1),
            ReportPeriod::ThreeMonths => sub_months(today, 3),
            ReportPeriod::SixMonths => sub_months(today, 6),
            ReportPeriod::YearToDate => {
                NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today)
            }
            ReportPeriod::OneYear => sub_months(today, 12),
            ReportPeriod::TwoYears => sub_months(today, 24),
            // Far enough back to cover any realistic holding history.
            ReportPeriod::Max => sub_months(today, 300),
        };
        (start, today)
    }
}

fn sub_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_to_date_starts_january_first() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let (start, end) = ReportPeriod::YearToDate.date_range(today);
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(end, today);
    }

    #[test]
    fn test_one_year_range() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let (start, _) = ReportPeriod::OneYear.date_range(today);
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    }

    #[test]
    fn test_month_end_clamps() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        let (start, _) = ReportPeriod::OneMonth.date_range(today);
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
    }
}
