pub mod currency_format;

pub use currency_format::format_inr;
