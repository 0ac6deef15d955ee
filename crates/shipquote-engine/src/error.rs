use shipquote_core::ServiceLevel;
use thiserror::Error;

/// Reasons a rate card is rejected at construction or load time.
#[derive(Debug, Error)]
pub enum RateTableError {
    #[error("rate table has no bands")]
    Empty,

    #[error("first band must start at 0 g, found {min_grams} g")]
    FirstBandNotAtZero { min_grams: u32 },

    #[error("band {index} is inverted: {min_grams} g > {max_grams} g")]
    InvertedBand {
        index: usize,
        min_grams: u32,
        max_grams: u32,
    },

    #[error("band {index} must start at {expected_min} g to be contiguous, found {found_min} g")]
    NotContiguous {
        index: usize,
        expected_min: u32,
        found_min: u32,
    },

    #[error("band {index} has a negative price")]
    NegativePrice { index: usize },

    #[error("band {index}: express price must be above economy price")]
    ExpressNotAboveEconomy { index: usize },

    #[error("surcharge per 100 g must not be negative")]
    NegativeSurcharge,

    #[error("{service} lead time must be at least one day")]
    ZeroLeadTime { service: ServiceLevel },

    #[error("regional pricing: {0}")]
    Regional(String),

    #[error("failed to read rate card {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rate card: {0}")]
    Parse(#[from] serde_yaml::Error),
}
