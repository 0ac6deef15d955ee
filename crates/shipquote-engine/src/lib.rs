pub mod error;
pub mod measure;
pub mod quote;
pub mod rate_card;
pub mod rate_table;
pub mod regional;
pub mod weight;

pub use error::RateTableError;
pub use measure::{parse_declared_weight, scan_measure, MassUnit, Measure};
pub use quote::QuoteEngine;
pub use rate_card::{load_rate_card, parse_rate_card, RateCard};
pub use rate_table::{RatePair, RateTable, WeightBand};
pub use regional::{RegionalPricing, RegionalZone};
pub use weight::{
    extract_weight, format_weight, raw_weight, total_weight, unit_weight, DEFAULT_UNIT_GRAMS,
    MIN_PARCEL_GRAMS,
};
