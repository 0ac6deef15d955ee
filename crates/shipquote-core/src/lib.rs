pub mod app_config;
pub mod cart;
pub mod config;
pub mod postal_code;
pub mod quote;

pub use app_config::{AppConfig, Environment};
pub use cart::{CartLine, DeliveryMode, ServiceLevel};
pub use config::{load_app_config, load_app_config_from_env};
pub use postal_code::PostalCode;
pub use quote::{Destination, QuoteSet, ServiceQuote, ShippingLineItem};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown delivery mode \"{0}\"; expected pickup, economy or express")]
    UnknownDeliveryMode(String),

    #[error("invalid postal code \"{0}\": expected 8 digits")]
    InvalidPostalCode(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
