pub mod analytics;
pub mod app_config;
pub mod cards;
pub mod config;
pub mod query;

pub use analytics::{
    AnalyticsReport, AnalyticsResult, CardRatings, PriceExtreme, PriceVsDistance, PriceVsRating,
    TopCard,
};
pub use app_config::{AppConfig, Environment};
pub use cards::NormalizedCard;
pub use config::{load_app_config, load_app_config_from_env};
pub use query::DishQuery;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("invalid {field}: {reason}")]
    InvalidQuery { field: &'static str, reason: String },
}
