use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};
use nivesh_market_data::LatestQuotePair;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::errors::Result;
use crate::market_data::MarketDataServiceTrait;

use super::holdings_model::{Holding, PriceSource, PricedHolding, ValuationOutcome};

/// Values a holdings set against fetched prices.
///
/// The valuation itself ([`compute`](Self::compute)) is a pure function
/// over the provided quote map; [`value_holdings`](Self::value_holdings)
/// is the orchestration that fetches the quotes first. A missing or
/// unusable price for one symbol degrades only that symbol (fallback
/// chain: fetched quote, imported current-price column, average cost) and
/// never aborts the pass.
pub struct HoldingsValuationService {
    market_data: Arc<dyn MarketDataServiceTrait>,
}

impl HoldingsValuationService {
    pub fn new(market_data: Arc<dyn MarketDataServiceTrait>) -> Self {
        Self { market_data }
    }

    /// Fetch latest/previous-close pairs for every holding and compute the
    /// enriched table. Symbols that ended up priced from a fallback source
    /// are reported in `missing_price_symbols`.
    pub async fn value_holdings(&self, holdings: &[Holding]) -> Result<ValuationOutcome> {
        if holdings.is_empty() {
            return Ok(ValuationOutcome {
                holdings: Vec::new(),
                missing_price_symbols: Vec::new(),
            });
        }
        debug!("Valuing {} holdings", holdings.len());

        let symbols: Vec<String> = holdings.iter().map(|h| h.symbol.clone()).collect();
        let quote_pairs = self.market_data.get_latest_quote_pairs(&symbols).await?;

        let priced = Self::compute(holdings, &quote_pairs.pairs);

        let missing_price_symbols: Vec<String> = priced
            .iter()
            .filter(|p| p.price_source != PriceSource::Fetched)
            .map(|p| p.symbol.clone())
            .collect();
        if !missing_price_symbols.is_empty() {
            warn!(
                "No fetched price for {} of {} holdings ({}). Valuation degraded to fallback prices.",
                missing_price_symbols.len(),
                priced.len(),
                missing_price_symbols.join(", ")
            );
        }

        Ok(ValuationOutcome {
            holdings: priced,
            missing_price_symbols,
        })
    }

    /// Pure valuation pass: derive the full metrics block for each holding
    /// from the provided quote map, then normalize weights against the
    /// summed current value.
    ///
    /// Every ratio guards its denominator and yields zero instead of
    /// failing; when the total current value is zero, every weight is zero.
    pub fn compute(
        holdings: &[Holding],
        quote_pairs: &HashMap<String, LatestQuotePair>,
    ) -> Vec<PricedHolding> {
        let mut priced: Vec<PricedHolding> = holdings
            .iter()
            .map(|holding| Self::price_holding(holding, quote_pairs.get(&holding.symbol)))
            .collect();

        let total_value: Decimal = priced.iter().map(|p| p.current_value).sum();

        for holding in &mut priced {
            holding.weight = if total_value.is_zero() {
                Decimal::ZERO
            } else {
                holding.current_value / total_value * dec!(100)
            };
            holding.weighted_return = holding.gain_pct * holding.weight / dec!(100);
        }

        priced
    }

    fn price_holding(holding: &Holding, pair: Option<&LatestQuotePair>) -> PricedHolding {
        let (current_price, price_source, as_of_date) = match pair {
            Some(qp) => (
                qp.latest.close,
                PriceSource::Fetched,
                Some(qp.latest.timestamp.date_naive()),
            ),
            None => match holding.fallback_price {
                Some(price) => (price, PriceSource::ImportedColumn, None),
                None => (holding.average_price, PriceSource::AverageCost, None),
            },
        };

        let previous_close = pair.and_then(|qp| qp.previous.as_ref()).map(|q| q.close);

        let invested = holding.quantity * holding.average_price;
        let current_value = holding.quantity * current_price;
        let gain = current_value - invested;
        let gain_pct = if invested.is_zero() {
            Decimal::ZERO
        } else {
            gain / invested * dec!(100)
        };

        let (today_change, today_pct) = match previous_close {
            Some(prev) => {
                let change = (current_price - prev) * holding.quantity;
                let pct = if prev.is_zero() {
                    Decimal::ZERO
                } else {
                    (current_price - prev) / prev * dec!(100)
                };
                (change, pct)
            }
            None => (Decimal::ZERO, Decimal::ZERO),
        };

        PricedHolding {
            id: holding.id.clone(),
            asset_name: holding.asset_name.clone(),
            symbol: holding.symbol.clone(),
            quantity: holding.quantity,
            average_price: holding.average_price,
            current_price,
            price_source,
            previous_close,
            invested,
            current_value,
            gain,
            gain_pct,
            today_change,
            today_pct,
            // Filled by the weight pass in compute()
            weight: Decimal::ZERO,
            weighted_return: Decimal::ZERO,
            as_of_date,
        }
    }
}
