pub mod market_data_model;
pub mod market_data_service;
pub mod market_data_traits;

pub use market_data_model::{CloseSeriesSet, PricePoint, QuotePairs};
pub use market_data_service::MarketDataService;
pub use market_data_traits::MarketDataServiceTrait;
