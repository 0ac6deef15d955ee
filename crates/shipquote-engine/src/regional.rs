use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::RateTableError;

/// A group of destination states sharing one price multiplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionalZone {
    pub states: Vec<String>,
    pub multiplier: Decimal,
}

/// Optional destination-state price adjustment, applied after table lookup.
///
/// Shipping within `origin_state` is never adjusted. Other states use their
/// zone's multiplier, or `default_multiplier` when no zone lists them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionalPricing {
    pub origin_state: String,
    #[serde(default)]
    pub zones: Vec<RegionalZone>,
    pub default_multiplier: Decimal,
}

impl RegionalPricing {
    /// Multiplier for a two-letter destination state, case-insensitive.
    #[must_use]
    pub fn multiplier_for(&self, state: &str) -> Decimal {
        let state = state.trim();
        if state.eq_ignore_ascii_case(&self.origin_state) {
            return Decimal::ONE;
        }
        self.zones
            .iter()
            .find(|zone| zone.states.iter().any(|s| s.eq_ignore_ascii_case(state)))
            .map_or(self.default_multiplier, |zone| zone.multiplier)
    }

    pub(crate) fn validate(&self) -> Result<(), RateTableError> {
        if self.origin_state.trim().is_empty() {
            return Err(RateTableError::Regional(
                "origin_state must be non-empty".to_string(),
            ));
        }
        if self.default_multiplier <= Decimal::ZERO {
            return Err(RateTableError::Regional(format!(
                "default_multiplier must be positive, found {}",
                self.default_multiplier
            )));
        }

        let mut seen = HashSet::new();
        seen.insert(self.origin_state.trim().to_ascii_uppercase());
        for zone in &self.zones {
            if zone.multiplier <= Decimal::ZERO {
                return Err(RateTableError::Regional(format!(
                    "zone multiplier must be positive, found {}",
                    zone.multiplier
                )));
            }
            for state in &zone.states {
                let key = state.trim().to_ascii_uppercase();
                if key.is_empty() {
                    return Err(RateTableError::Regional(
                        "zone lists an empty state code".to_string(),
                    ));
                }
                if !seen.insert(key) {
                    return Err(RateTableError::Regional(format!(
                        "state '{state}' appears more than once"
                    )));
                }
            }
        }
        Ok(())
    }
}
