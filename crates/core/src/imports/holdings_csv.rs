//! Holdings table ingestion from CSV.
//!
//! Schema errors (a missing required column) fail the whole load; no
//! partial load is attempted. Row-level problems (unparseable numbers, a
//! non-positive quantity) degrade only that row and are reported back
//! alongside the accepted rows.

use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use csv::ReaderBuilder;
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{Error, Result, ValidationError};
use crate::portfolio::holdings::Holding;

/// Accepted header spellings per required column, matched after trimming
/// and lowercasing.
const ASSET_NAME_HEADERS: &[&str] = &["asset name", "asset", "name"];
const SYMBOL_HEADERS: &[&str] = &["symbol", "ticker"];
const QUANTITY_HEADERS: &[&str] = &["quantity", "qty"];
const AVERAGE_PRICE_HEADERS: &[&str] = &["average price", "avg price", "average cost", "avg cost"];
const CURRENT_PRICE_HEADERS: &[&str] = &["current price", "last price"];

/// Error encountered on one row of the holdings table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    /// Zero-based data row index (header excluded).
    pub row_index: usize,
    pub message: String,
}

/// Result of loading a holdings table: the accepted rows plus per-row
/// errors for the rejected ones.
#[derive(Debug, Clone)]
pub struct HoldingsImportResult {
    pub holdings: Vec<Holding>,
    pub errors: Vec<RowError>,
}

/// Load holdings from a CSV file on disk.
pub fn load_holdings_from_path(path: impl AsRef<Path>) -> Result<HoldingsImportResult> {
    let file = std::fs::File::open(path)?;
    load_holdings(file)
}

/// Load holdings from any CSV reader.
pub fn load_holdings<R: Read>(reader: R) -> Result<HoldingsImportResult> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();

    let asset_name_col = find_column(&headers, ASSET_NAME_HEADERS, "asset name")?;
    let symbol_col = find_column(&headers, SYMBOL_HEADERS, "symbol")?;
    let quantity_col = find_column(&headers, QUANTITY_HEADERS, "quantity")?;
    let average_price_col = find_column(&headers, AVERAGE_PRICE_HEADERS, "average price")?;
    // Optional last-resort price fallback
    let current_price_col = find_column(&headers, CURRENT_PRICE_HEADERS, "current price").ok();

    let mut holdings = Vec::new();
    let mut errors = Vec::new();

    for (row_index, record) in csv_reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                errors.push(RowError {
                    row_index,
                    message: format!("Unreadable row: {}", e),
                });
                continue;
            }
        };

        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        match parse_row(
            &record,
            asset_name_col,
            symbol_col,
            quantity_col,
            average_price_col,
            current_price_col,
        ) {
            Ok(holding) => holdings.push(holding),
            Err(message) => {
                warn!("Holdings row {} rejected: {}", row_index, message);
                errors.push(RowError { row_index, message });
            }
        }
    }

    debug!(
        "Loaded {} holdings ({} rows rejected)",
        holdings.len(),
        errors.len()
    );

    Ok(HoldingsImportResult { holdings, errors })
}

fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

fn find_column(headers: &[String], accepted: &[&str], name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| accepted.contains(&h.as_str()))
        .ok_or_else(|| Error::Validation(ValidationError::MissingField(name.to_string())))
}

fn field(record: &csv::StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or("").trim()
}

/// Parse a decimal cell, tolerating thousands separators and a currency
/// symbol.
fn parse_decimal(raw: &str, column: &str) -> std::result::Result<Decimal, String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ',' | '₹' | ' '))
        .collect();
    Decimal::from_str(&cleaned).map_err(|_| format!("Invalid {} value '{}'", column, raw))
}

fn parse_row(
    record: &csv::StringRecord,
    asset_name_col: usize,
    symbol_col: usize,
    quantity_col: usize,
    average_price_col: usize,
    current_price_col: Option<usize>,
) -> std::result::Result<Holding, String> {
    let symbol = field(record, symbol_col);
    if symbol.is_empty() {
        return Err("Blank symbol".to_string());
    }

    let asset_name = field(record, asset_name_col);

    let quantity = parse_decimal(field(record, quantity_col), "quantity")?;
    if quantity <= Decimal::ZERO {
        return Err(format!("Quantity must be positive, got {}", quantity));
    }

    let average_price = parse_decimal(field(record, average_price_col), "average price")?;
    if average_price < Decimal::ZERO {
        return Err(format!(
            "Average price must be non-negative, got {}",
            average_price
        ));
    }

    let fallback_price = match current_price_col {
        Some(col) => {
            let raw = field(record, col);
            if raw.is_empty() {
                None
            } else {
                Some(parse_decimal(raw, "current price")?)
            }
        }
        None => None,
    };

    Ok(Holding {
        id: Uuid::new_v4().to_string(),
        asset_name: if asset_name.is_empty() {
            symbol.to_string()
        } else {
            asset_name.to_string()
        },
        symbol: symbol.to_string(),
        quantity,
        average_price,
        fallback_price,
    })
}
