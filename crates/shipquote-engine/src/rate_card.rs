use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::RateTableError;
use crate::rate_table::{RateTable, WeightBand};
use crate::regional::RegionalPricing;

/// A validated rate table plus its optional regional adjustment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateCard {
    pub table: RateTable,
    pub regional: Option<RegionalPricing>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct LeadTimes {
    economy: u32,
    express: u32,
}

/// On-disk shape of `config/rate_table.yaml`.
#[derive(Debug, Deserialize)]
struct RateCardFile {
    surcharge_per_100g: Decimal,
    lead_time_days: LeadTimes,
    bands: Vec<WeightBand>,
    #[serde(default)]
    regional: Option<RegionalPricing>,
}

/// Load and validate a rate card from a YAML file.
///
/// # Errors
///
/// Returns `RateTableError` if the file cannot be read, parsed, or fails validation.
pub fn load_rate_card(path: &Path) -> Result<RateCard, RateTableError> {
    let content = std::fs::read_to_string(path).map_err(|e| RateTableError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_rate_card(&content)
}

/// Parse and validate a rate card from YAML text.
///
/// # Errors
///
/// Returns `RateTableError` if the YAML is malformed or fails validation.
pub fn parse_rate_card(yaml: &str) -> Result<RateCard, RateTableError> {
    let file: RateCardFile = serde_yaml::from_str(yaml)?;

    let table = RateTable::new(
        file.bands,
        file.surcharge_per_100g,
        file.lead_time_days.economy,
        file.lead_time_days.express,
    )?;
    if let Some(regional) = &file.regional {
        regional.validate()?;
    }

    Ok(RateCard {
        table,
        regional: file.regional,
    })
}
