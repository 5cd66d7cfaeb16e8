use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::errors::Result;
use crate::market_data::{CloseSeriesSet, MarketDataServiceTrait, PricePoint, QuotePairs};
use crate::portfolio::holdings::Holding;
use crate::portfolio::performance::{
    AlignedReturns, PerformanceService, ReportPeriod, ReturnData, ValuePoint,
};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
}

fn point(day: u32, close: Decimal) -> PricePoint {
    PricePoint {
        date: date(day),
        close,
    }
}

fn holding(symbol: &str, quantity: Decimal) -> Holding {
    Holding {
        id: format!("H-{}", symbol),
        asset_name: symbol.to_string(),
        symbol: symbol.to_string(),
        quantity,
        average_price: dec!(100),
        fallback_price: None,
    }
}

// --- Value series ---

#[test]
fn test_build_value_series_sums_quantity_times_price() {
    let holdings = vec![holding("A", dec!(10)), holding("B", dec!(5))];
    let mut series = HashMap::new();
    series.insert(
        "A".to_string(),
        vec![point(10, dec!(100)), point(11, dec!(102))],
    );
    series.insert(
        "B".to_string(),
        vec![point(10, dec!(200)), point(11, dec!(198))],
    );

    let values = PerformanceService::build_value_series(&holdings, &series);

    assert_eq!(values.len(), 2);
    assert_eq!(values[0].value, dec!(2000)); // 10x100 + 5x200
    assert_eq!(values[1].value, dec!(2010)); // 10x102 + 5x198
}

#[test]
fn test_build_value_series_forward_fills_missing_days() {
    let holdings = vec![holding("A", dec!(1)), holding("B", dec!(1))];
    let mut series = HashMap::new();
    // A misses day 11; its close carries forward.
    series.insert(
        "A".to_string(),
        vec![point(10, dec!(100)), point(12, dec!(104))],
    );
    series.insert(
        "B".to_string(),
        vec![
            point(10, dec!(50)),
            point(11, dec!(51)),
            point(12, dec!(52)),
        ],
    );

    let values = PerformanceService::build_value_series(&holdings, &series);

    assert_eq!(values.len(), 3);
    assert_eq!(values[1].date, date(11));
    assert_eq!(values[1].value, dec!(151)); // 100 carried + 51
}

#[test]
fn test_build_value_series_skips_symbols_without_history() {
    let holdings = vec![holding("A", dec!(1)), holding("GHOST", dec!(1))];
    let mut series = HashMap::new();
    series.insert(
        "A".to_string(),
        vec![point(10, dec!(100)), point(11, dec!(101))],
    );

    let values = PerformanceService::build_value_series(&holdings, &series);

    assert_eq!(values.len(), 2);
    assert_eq!(values[0].value, dec!(100));
}

#[test]
fn test_build_value_series_empty_without_any_history() {
    let holdings = vec![holding("A", dec!(1))];
    let values = PerformanceService::build_value_series(&holdings, &HashMap::new());
    assert!(values.is_empty());
}

#[test]
fn test_daily_returns() {
    let values = vec![
        ValuePoint {
            date: date(10),
            value: dec!(2000),
        },
        ValuePoint {
            date: date(11),
            value: dec!(2020),
        },
        ValuePoint {
            date: date(12),
            value: dec!(1990),
        },
    ];

    let returns = PerformanceService::daily_returns(&values);

    assert_eq!(returns.len(), 2);
    assert_eq!(returns[0].value, dec!(0.01));
    assert_eq!(returns[1].value, dec!(1990) / dec!(2020) - Decimal::ONE);
}

#[test]
fn test_daily_returns_zero_previous_value() {
    let values = vec![
        ValuePoint {
            date: date(10),
            value: Decimal::ZERO,
        },
        ValuePoint {
            date: date(11),
            value: dec!(100),
        },
    ];

    let returns = PerformanceService::daily_returns(&values);

    assert_eq!(returns[0].value, Decimal::ZERO);
}

#[test]
fn test_align_returns_inner_join() {
    let portfolio = vec![
        ReturnData {
            date: date(10),
            value: dec!(0.01),
        },
        ReturnData {
            date: date(11),
            value: dec!(0.02),
        },
        ReturnData {
            date: date(13),
            value: dec!(0.03),
        },
    ];
    let benchmark = vec![
        ReturnData {
            date: date(11),
            value: dec!(0.005),
        },
        ReturnData {
            date: date(12),
            value: dec!(0.006),
        },
        ReturnData {
            date: date(13),
            value: dec!(0.007),
        },
    ];

    let aligned = PerformanceService::align_returns(&portfolio, &benchmark);

    assert_eq!(aligned.len(), 2);
    assert_eq!(aligned.portfolio, vec![dec!(0.02), dec!(0.03)]);
    assert_eq!(aligned.benchmark, vec![dec!(0.005), dec!(0.007)]);
}

// --- Metrics bundle ---

#[test]
fn test_compute_metrics_known_series() {
    let returns = vec![dec!(0.01), dec!(-0.02), dec!(0.015), dec!(0.0)];

    let metrics =
        PerformanceService::compute_metrics(&returns, None, dec!(0.06)).expect("bundle");

    // 1.01 x 0.98 x 1.015 x 1.0 - 1
    assert_eq!(metrics.total_return, dec!(0.0046470));
    assert!(metrics.max_drawdown <= Decimal::ZERO);
    // Sharpe carries the sign of the mean excess return.
    let mean = returns.iter().sum::<Decimal>() / dec!(4);
    let excess = mean - dec!(0.06) / dec!(252);
    assert_eq!(metrics.sharpe_ratio > Decimal::ZERO, excess > Decimal::ZERO);
    assert_eq!(metrics.win_rate, dec!(0.5));
    assert_eq!(metrics.best_day, dec!(0.015));
    assert_eq!(metrics.worst_day, dec!(-0.02));
}

#[test]
fn test_compute_metrics_insufficient_history() {
    assert!(PerformanceService::compute_metrics(&[], None, dec!(0.06)).is_none());
    assert!(PerformanceService::compute_metrics(&[dec!(0.01)], None, dec!(0.06)).is_none());
}

#[test]
fn test_compute_metrics_zero_volatility() {
    let returns = vec![dec!(0.01); 5];

    let metrics = PerformanceService::compute_metrics(&returns, None, Decimal::ZERO).unwrap();

    assert_eq!(metrics.daily_volatility, Decimal::ZERO);
    assert_eq!(metrics.sharpe_ratio, Decimal::ZERO);
    // No negative days and zero volatility: Sortino falls to zero too.
    assert_eq!(metrics.sortino_ratio, Decimal::ZERO);
}

#[test]
fn test_drawdown_series() {
    // Up, down, down, recover
    let returns = vec![dec!(0.10), dec!(-0.10), dec!(-0.10), dec!(0.05)];

    let metrics = PerformanceService::compute_metrics(&returns, None, Decimal::ZERO).unwrap();

    assert_eq!(metrics.drawdown[0], Decimal::ZERO);
    // Peak 1.10, trough 1.10 x 0.9 x 0.9 = 0.891
    let expected_max = (dec!(0.891) - dec!(1.10)) / dec!(1.10);
    assert_eq!(metrics.max_drawdown, expected_max);
    assert_eq!(metrics.drawdown.len(), returns.len());
}

#[test]
fn test_calmar_zero_when_no_drawdown() {
    let returns = vec![dec!(0.01), dec!(0.02), dec!(0.01)];

    let metrics = PerformanceService::compute_metrics(&returns, None, Decimal::ZERO).unwrap();

    assert_eq!(metrics.max_drawdown, Decimal::ZERO);
    assert_eq!(metrics.calmar_ratio, Decimal::ZERO);
}

#[test]
fn test_sortino_falls_back_to_volatility_without_losses() {
    let returns = vec![dec!(0.01), dec!(0.03), dec!(0.02), dec!(0.04)];

    let metrics = PerformanceService::compute_metrics(&returns, None, Decimal::ZERO).unwrap();

    // Without negative days the downside deviation falls back to the
    // full volatility, so Sortino equals Sharpe.
    assert_eq!(metrics.sortino_ratio, metrics.sharpe_ratio);
}

#[test]
fn test_var_and_cvar() {
    let returns = vec![
        dec!(-0.05),
        dec!(-0.03),
        dec!(-0.01),
        dec!(0.0),
        dec!(0.01),
        dec!(0.02),
        dec!(0.03),
        dec!(0.04),
        dec!(0.05),
        dec!(0.06),
    ];

    let metrics = PerformanceService::compute_metrics(&returns, None, Decimal::ZERO).unwrap();

    // rank = 0.05 x 9 = 0.45 between -0.05 and -0.03
    let expected_var95 = dec!(-0.05) + dec!(0.45) * (dec!(-0.03) - dec!(-0.05));
    assert_eq!(metrics.var_95, expected_var95);
    assert!(metrics.var_99 <= metrics.var_95);
    // Only -0.05 sits at or below the threshold
    assert_eq!(metrics.cvar_95, dec!(-0.05));
}

#[test]
fn test_profit_factor() {
    let with_losses = vec![dec!(0.02), dec!(-0.01), dec!(0.03), dec!(-0.02)];
    let metrics =
        PerformanceService::compute_metrics(&with_losses, None, Decimal::ZERO).unwrap();
    assert_eq!(metrics.profit_factor, Some(dec!(0.05) / dec!(0.03)));

    let no_losses = vec![dec!(0.02), dec!(0.01), dec!(0.03)];
    let metrics = PerformanceService::compute_metrics(&no_losses, None, Decimal::ZERO).unwrap();
    assert_eq!(metrics.profit_factor, None);
}

#[test]
fn test_skewness_and_kurtosis_zero_for_symmetric_flat_series() {
    let constant = vec![dec!(0.01); 6];
    let metrics = PerformanceService::compute_metrics(&constant, None, Decimal::ZERO).unwrap();
    assert_eq!(metrics.skewness, Decimal::ZERO);
    assert_eq!(metrics.kurtosis, Decimal::ZERO);

    // Symmetric distribution: skewness exactly zero
    let symmetric = vec![dec!(-0.02), dec!(-0.01), dec!(0.0), dec!(0.01), dec!(0.02)];
    let metrics = PerformanceService::compute_metrics(&symmetric, None, Decimal::ZERO).unwrap();
    assert_eq!(metrics.skewness, Decimal::ZERO);
}

#[test]
fn test_rolling_window_rule() {
    // n/3 clamped to [10, 63]
    let short: Vec<Decimal> = (0..15).map(|i| Decimal::from(i) / dec!(1000)).collect();
    let metrics = PerformanceService::compute_metrics(&short, None, Decimal::ZERO).unwrap();
    assert_eq!(metrics.rolling_window, 10);
    assert_eq!(metrics.rolling_sharpe.len(), 15 - 10 + 1);

    let long: Vec<Decimal> = (0..300).map(|i| Decimal::from(i % 7) / dec!(1000)).collect();
    let metrics = PerformanceService::compute_metrics(&long, None, Decimal::ZERO).unwrap();
    assert_eq!(metrics.rolling_window, 63);
    assert_eq!(metrics.rolling_sharpe.len(), 300 - 63 + 1);

    let medium: Vec<Decimal> = (0..90).map(|i| Decimal::from(i % 5) / dec!(1000)).collect();
    let metrics = PerformanceService::compute_metrics(&medium, None, Decimal::ZERO).unwrap();
    assert_eq!(metrics.rolling_window, 30);
}

// --- Benchmark-relative block ---

fn aligned_identical(n: usize) -> AlignedReturns {
    let series: Vec<Decimal> = (0..n)
        .map(|i| Decimal::from((i % 5) as i64 - 2) / dec!(100))
        .collect();
    AlignedReturns {
        portfolio: series.clone(),
        benchmark: series,
    }
}

#[test]
fn test_benchmark_identical_series() {
    let aligned = aligned_identical(20);

    let metrics = PerformanceService::compute_metrics(
        &aligned.portfolio.clone(),
        Some(&aligned),
        dec!(0.06),
    )
    .unwrap();
    let bench = metrics.benchmark.expect("benchmark block");

    assert_eq!(bench.beta, Decimal::ONE);
    // Correlation goes through an approximate sqrt; allow rounding slack.
    assert!((bench.correlation - Decimal::ONE).abs() < dec!(0.000000000001));
    assert!((bench.r_squared - Decimal::ONE).abs() < dec!(0.000000000001));
    assert_eq!(bench.tracking_error, Decimal::ZERO);
    assert_eq!(bench.information_ratio, Decimal::ZERO);
    assert_eq!(bench.alpha, Decimal::ZERO);
    assert_eq!(bench.up_capture, dec!(100));
    assert_eq!(bench.down_capture, dec!(100));
}

#[test]
fn test_benchmark_requires_min_observations() {
    let aligned = aligned_identical(10); // below the 11 minimum

    let metrics = PerformanceService::compute_metrics(
        &aligned.portfolio.clone(),
        Some(&aligned),
        dec!(0.06),
    )
    .unwrap();

    assert!(metrics.benchmark.is_none());
}

#[test]
fn test_beta_one_when_benchmark_constant() {
    let portfolio: Vec<Decimal> = (0..12).map(|i| Decimal::from(i % 3) / dec!(100)).collect();
    let aligned = AlignedReturns {
        portfolio: portfolio.clone(),
        benchmark: vec![dec!(0.01); 12],
    };

    let metrics =
        PerformanceService::compute_metrics(&portfolio, Some(&aligned), dec!(0.06)).unwrap();
    let bench = metrics.benchmark.unwrap();

    assert_eq!(bench.beta, Decimal::ONE);
}

#[test]
fn test_down_capture_100_when_benchmark_never_falls() {
    let portfolio: Vec<Decimal> = (0..12).map(|i| Decimal::from(i % 3) / dec!(100)).collect();
    let aligned = AlignedReturns {
        portfolio: portfolio.clone(),
        benchmark: vec![dec!(0.01); 12],
    };

    let metrics =
        PerformanceService::compute_metrics(&portfolio, Some(&aligned), dec!(0.06)).unwrap();
    let bench = metrics.benchmark.unwrap();

    assert_eq!(bench.down_capture, dec!(100));
    assert!(bench.up_capture > Decimal::ZERO);
}

#[test]
fn test_beta_two_for_leveraged_portfolio() {
    let benchmark: Vec<Decimal> = (0..20)
        .map(|i| Decimal::from((i % 5) as i64 - 2) / dec!(100))
        .collect();
    let portfolio: Vec<Decimal> = benchmark.iter().map(|b| b * dec!(2)).collect();
    let aligned = AlignedReturns {
        portfolio: portfolio.clone(),
        benchmark,
    };

    let metrics =
        PerformanceService::compute_metrics(&portfolio, Some(&aligned), dec!(0.06)).unwrap();
    let bench = metrics.benchmark.unwrap();

    assert_eq!(bench.beta, dec!(2));
    assert!((bench.correlation - Decimal::ONE).abs() < dec!(0.000000000001));
}

// --- Holding period returns ---

#[test]
fn test_holding_period_returns() {
    let holdings = vec![holding("A", dec!(10)), holding("B", dec!(5))];
    let mut series = HashMap::new();
    series.insert(
        "A".to_string(),
        vec![point(10, dec!(100)), point(12, dec!(110))],
    );
    series.insert(
        "B".to_string(),
        vec![point(10, dec!(200)), point(12, dec!(190))],
    );

    let mut rows = PerformanceService::holding_period_returns(&holdings, &series);
    rows.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].period_return_pct, dec!(10));
    assert_eq!(rows[1].period_return_pct, dec!(-5));
}

#[test]
fn test_holding_period_returns_skips_zero_start_price() {
    let holdings = vec![holding("A", dec!(10))];
    let mut series = HashMap::new();
    series.insert(
        "A".to_string(),
        vec![point(10, Decimal::ZERO), point(12, dec!(110))],
    );

    let rows = PerformanceService::holding_period_returns(&holdings, &series);
    assert!(rows.is_empty());
}

// --- Orchestration ---

struct MockMarketDataService {
    series: HashMap<String, Vec<PricePoint>>,
}

#[async_trait]
impl MarketDataServiceTrait for MockMarketDataService {
    async fn get_latest_quote_pairs(&self, _symbols: &[String]) -> Result<QuotePairs> {
        Ok(QuotePairs::default())
    }

    async fn get_daily_close_series(
        &self,
        symbols: &[String],
        _start_date: NaiveDate,
        _end_date: NaiveDate,
    ) -> Result<CloseSeriesSet> {
        let series: HashMap<String, Vec<PricePoint>> = symbols
            .iter()
            .filter_map(|s| self.series.get(s).map(|pts| (s.clone(), pts.clone())))
            .collect();
        let missing = symbols
            .iter()
            .filter(|s| !series.contains_key(*s))
            .cloned()
            .collect();
        Ok(CloseSeriesSet { series, missing })
    }

    async fn refresh(&self) {}
}

#[tokio::test]
async fn test_analyze_end_to_end() {
    let mut series = HashMap::new();
    series.insert(
        "A".to_string(),
        (10..=24)
            .map(|d| point(d, dec!(100) + Decimal::from(d)))
            .collect::<Vec<_>>(),
    );
    series.insert(
        "^BENCH".to_string(),
        (10..=24)
            .map(|d| point(d, dec!(1000) + Decimal::from(d * 2)))
            .collect::<Vec<_>>(),
    );

    let service = PerformanceService::new(Arc::new(MockMarketDataService { series }));
    let holdings = vec![holding("A", dec!(10))];

    let report = service
        .analyze(
            &holdings,
            Some("^BENCH"),
            ReportPeriod::OneMonth,
            dec!(0.06),
            date(25),
        )
        .await
        .unwrap();

    assert_eq!(report.value_series.len(), 15);
    assert_eq!(report.returns.len(), 14);
    assert_eq!(report.drawdown_series.len(), 14);
    assert!(report.missing_symbols.is_empty());
    let metrics = report.metrics.expect("bundle");
    assert!(metrics.total_return > Decimal::ZERO);
    // 14 aligned pairs clears the 11-observation bar
    assert!(metrics.benchmark.is_some());
    assert_eq!(report.holding_returns.len(), 1);
}

#[tokio::test]
async fn test_analyze_with_missing_benchmark() {
    let mut series = HashMap::new();
    series.insert(
        "A".to_string(),
        vec![point(10, dec!(100)), point(11, dec!(101))],
    );

    let service = PerformanceService::new(Arc::new(MockMarketDataService { series }));
    let holdings = vec![holding("A", dec!(10))];

    let report = service
        .analyze(
            &holdings,
            Some("^GHOST"),
            ReportPeriod::OneWeek,
            dec!(0.06),
            date(12),
        )
        .await
        .unwrap();

    assert!(report
        .missing_symbols
        .contains(&"^GHOST".to_string()));
    assert!(report.metrics.is_some());
    assert!(report.metrics.unwrap().benchmark.is_none());
}

#[tokio::test]
async fn test_analyze_without_any_history_is_empty_not_error() {
    let service = PerformanceService::new(Arc::new(MockMarketDataService {
        series: HashMap::new(),
    }));
    let holdings = vec![holding("A", dec!(10))];

    let report = service
        .analyze(&holdings, None, ReportPeriod::OneYear, dec!(0.06), date(25))
        .await
        .unwrap();

    assert!(report.value_series.is_empty());
    assert!(report.metrics.is_none());
    assert_eq!(report.missing_symbols, vec!["A".to_string()]);
}
