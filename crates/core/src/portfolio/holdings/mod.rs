pub mod holdings_model;
pub mod holdings_valuation_service;


pub use holdings_model::{Holding, PriceSource, PricedHolding, ValuationOutcome};
pub use holdings_valuation_service::HoldingsValuationService;
