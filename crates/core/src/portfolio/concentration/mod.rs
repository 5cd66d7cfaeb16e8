pub mod concentration_model;
pub mod concentration_service;

pub use concentration_model::ConcentrationMetrics;
pub use concentration_service::{analyze, top_k_concentration};
