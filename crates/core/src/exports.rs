//! Round-trippable export of the holdings table.
//!
//! Derived columns (invested, current value, gain, weight, ...) are
//! stripped: they are recomputed on every load, so exporting them would
//! only bake in stale values. What remains matches the import schema,
//! with the fetched price preserved as the current-price column.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::portfolio::holdings::PricedHolding;

/// One exportable holdings row, import-schema compatible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingExportRow {
    pub asset_name: String,
    pub symbol: String,
    pub quantity: Decimal,
    pub average_price: Decimal,
    pub current_price: Decimal,
}

/// Strip the derived columns from the priced holdings.
pub fn export_rows(priced: &[PricedHolding]) -> Vec<HoldingExportRow> {
    priced
        .iter()
        .map(|p| HoldingExportRow {
            asset_name: p.asset_name.clone(),
            symbol: p.symbol.clone(),
            quantity: p.quantity,
            average_price: p.average_price,
            current_price: p.current_price,
        })
        .collect()
}
