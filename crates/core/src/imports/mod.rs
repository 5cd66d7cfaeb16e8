pub mod holdings_csv;

pub use holdings_csv::{load_holdings, load_holdings_from_path, HoldingsImportResult, RowError};
