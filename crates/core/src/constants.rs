use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Trading days per year, used for annualization.
pub const TRADING_DAYS_PER_YEAR: u32 = 252;

/// sqrt(252), used when Decimal sqrt is unavailable.
pub const SQRT_TRADING_DAYS_APPROX: Decimal = dec!(15.874507866);

/// Decimal precision for valuation calculations.
pub const DECIMAL_PRECISION: u32 = 6;

/// Decimal precision for display.
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Default annual risk-free rate (Indian 10-year yield, approximately).
pub const DEFAULT_RISK_FREE_RATE: Decimal = dec!(0.06);

/// Default number of top holdings for concentration summaries.
pub const DEFAULT_TOP_N: usize = 5;

/// Minimum paired observations before benchmark-relative statistics are
/// computed.
pub const MIN_BENCHMARK_OBSERVATIONS: usize = 11;

/// Minimum return observations for a non-empty performance bundle.
pub const MIN_RETURN_OBSERVATIONS: usize = 2;

/// Rolling-window bounds: min(ROLLING_WINDOW_MAX, max(ROLLING_WINDOW_MIN, n / 3)).
pub const ROLLING_WINDOW_MAX: usize = 63;
pub const ROLLING_WINDOW_MIN: usize = 10;
