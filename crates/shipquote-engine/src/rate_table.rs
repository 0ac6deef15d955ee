//! Banded carrier rate table with linear extrapolation above the ceiling.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use shipquote_core::ServiceLevel;

use crate::error::RateTableError;

/// One row of the rate table. Both bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightBand {
    pub min_grams: u32,
    pub max_grams: u32,
    pub economy_price: Decimal,
    pub express_price: Decimal,
}

impl WeightBand {
    #[must_use]
    pub fn contains(&self, grams: u32) -> bool {
        self.min_grams <= grams && grams <= self.max_grams
    }

    #[must_use]
    pub fn price(&self, service: ServiceLevel) -> Decimal {
        match service {
            ServiceLevel::Economy => self.economy_price,
            ServiceLevel::Express => self.express_price,
        }
    }
}

/// Prices for both service levels at one weight, rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePair {
    pub economy_price: Decimal,
    pub express_price: Decimal,
}

impl RatePair {
    #[must_use]
    pub fn price(&self, service: ServiceLevel) -> Decimal {
        match service {
            ServiceLevel::Economy => self.economy_price,
            ServiceLevel::Express => self.express_price,
        }
    }

    #[must_use]
    pub fn map(self, f: impl Fn(Decimal) -> Decimal) -> Self {
        Self {
            economy_price: round_cents(f(self.economy_price)),
            express_price: round_cents(f(self.express_price)),
        }
    }
}

/// Carrier rate card for 2024: `(min g, max g, economy cents, express cents)`.
const CANONICAL_BANDS: [(u32, u32, i64, i64); 13] = [
    (0, 300, 1999, 2499),
    (301, 400, 2049, 2649),
    (401, 500, 2199, 2899),
    (501, 600, 2349, 3049),
    (601, 700, 2499, 3299),
    (701, 800, 2649, 3499),
    (801, 900, 2799, 3699),
    (901, 1000, 2949, 3899),
    (1001, 1100, 3099, 4099),
    (1101, 1200, 3249, 4299),
    (1201, 1300, 3399, 4499),
    (1301, 1400, 3549, 4699),
    (1401, 1500, 3699, 4899),
];
const CANONICAL_SURCHARGE_CENTS_PER_100G: i64 = 200;
const CANONICAL_ECONOMY_LEAD_TIME_DAYS: u32 = 5;
const CANONICAL_EXPRESS_LEAD_TIME_DAYS: u32 = 2;

/// Validated, immutable rate table.
///
/// Invariants (checked by [`RateTable::new`]): at least one band, the first
/// band starts at 0 g, bands are contiguous and ascending, prices are
/// non-negative and express is priced above economy in every band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateTable {
    bands: Vec<WeightBand>,
    surcharge_per_100g: Decimal,
    economy_lead_time_days: u32,
    express_lead_time_days: u32,
}

impl RateTable {
    /// Builds a rate table, rejecting any band layout that breaks the table
    /// invariants.
    ///
    /// # Errors
    ///
    /// Returns the first [`RateTableError`] found.
    pub fn new(
        bands: Vec<WeightBand>,
        surcharge_per_100g: Decimal,
        economy_lead_time_days: u32,
        express_lead_time_days: u32,
    ) -> Result<Self, RateTableError> {
        let table = Self {
            bands,
            surcharge_per_100g,
            economy_lead_time_days,
            express_lead_time_days,
        };
        table.validate()?;
        Ok(table)
    }

    /// The built-in carrier table: 13 bands up to 1500 g, R$ 2,00 per extra
    /// 100 g, economy in 5 days and express in 2.
    #[must_use]
    pub fn canonical() -> Self {
        let bands = CANONICAL_BANDS
            .iter()
            .map(|&(min_grams, max_grams, economy, express)| WeightBand {
                min_grams,
                max_grams,
                economy_price: Decimal::new(economy, 2),
                express_price: Decimal::new(express, 2),
            })
            .collect();
        Self {
            bands,
            surcharge_per_100g: Decimal::new(CANONICAL_SURCHARGE_CENTS_PER_100G, 2),
            economy_lead_time_days: CANONICAL_ECONOMY_LEAD_TIME_DAYS,
            express_lead_time_days: CANONICAL_EXPRESS_LEAD_TIME_DAYS,
        }
    }

    #[must_use]
    pub fn bands(&self) -> &[WeightBand] {
        &self.bands
    }

    #[must_use]
    pub fn surcharge_per_100g(&self) -> Decimal {
        self.surcharge_per_100g
    }

    /// Upper bound of the highest band; heavier carts are extrapolated.
    #[must_use]
    pub fn ceiling_grams(&self) -> u32 {
        self.bands.last().map_or(0, |b| b.max_grams)
    }

    /// Lead time is a property of the service, not of the weight.
    #[must_use]
    pub fn lead_time_days(&self, service: ServiceLevel) -> u32 {
        match service {
            ServiceLevel::Economy => self.economy_lead_time_days,
            ServiceLevel::Express => self.express_lead_time_days,
        }
    }

    /// Prices for both service levels at `total_grams`.
    ///
    /// Weights inside a band get that band's prices. Above the ceiling the
    /// last band's prices grow by `surcharge_per_100g` for every 100 g of
    /// excess, pro rata and without further banding.
    #[must_use]
    pub fn lookup(&self, total_grams: u32) -> RatePair {
        if let Some(band) = self.bands.iter().find(|b| b.contains(total_grams)) {
            return RatePair {
                economy_price: round_cents(band.economy_price),
                express_price: round_cents(band.express_price),
            };
        }

        // Validated tables start at 0 g and are contiguous, so a miss is
        // always above the last band.
        let Some(last) = self.bands.last() else {
            return RatePair {
                economy_price: Decimal::ZERO,
                express_price: Decimal::ZERO,
            };
        };
        let excess_grams = total_grams.saturating_sub(last.max_grams);
        let surcharge =
            self.surcharge_per_100g * Decimal::from(excess_grams) / Decimal::ONE_HUNDRED;

        RatePair {
            economy_price: round_cents(last.economy_price + surcharge),
            express_price: round_cents(last.express_price + surcharge),
        }
    }

    fn validate(&self) -> Result<(), RateTableError> {
        let first = self.bands.first().ok_or(RateTableError::Empty)?;
        if first.min_grams != 0 {
            return Err(RateTableError::FirstBandNotAtZero {
                min_grams: first.min_grams,
            });
        }

        for (index, band) in self.bands.iter().enumerate() {
            if band.min_grams > band.max_grams {
                return Err(RateTableError::InvertedBand {
                    index,
                    min_grams: band.min_grams,
                    max_grams: band.max_grams,
                });
            }
            if band.economy_price.is_sign_negative() || band.express_price.is_sign_negative() {
                return Err(RateTableError::NegativePrice { index });
            }
            if band.express_price <= band.economy_price {
                return Err(RateTableError::ExpressNotAboveEconomy { index });
            }
        }

        for (index, pair) in self.bands.windows(2).enumerate() {
            let expected_min = pair[0].max_grams.saturating_add(1);
            if pair[1].min_grams != expected_min {
                return Err(RateTableError::NotContiguous {
                    index: index + 1,
                    expected_min,
                    found_min: pair[1].min_grams,
                });
            }
        }

        if self.surcharge_per_100g.is_sign_negative() {
            return Err(RateTableError::NegativeSurcharge);
        }
        for service in [ServiceLevel::Economy, ServiceLevel::Express] {
            if self.lead_time_days(service) == 0 {
                return Err(RateTableError::ZeroLeadTime { service });
            }
        }
        Ok(())
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::canonical()
    }
}

/// Rounds a currency amount to cents, half up, always with two decimals.
pub(crate) fn round_cents(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cents(value: i64) -> Decimal {
        Decimal::new(value, 2)
    }

    fn band(min_grams: u32, max_grams: u32, economy: i64, express: i64) -> WeightBand {
        WeightBand {
            min_grams,
            max_grams,
            economy_price: cents(economy),
            express_price: cents(express),
        }
    }

    // -----------------------------------------------------------------------
    // canonical table
    // -----------------------------------------------------------------------

    #[test]
    fn canonical_table_is_valid() {
        let canonical = RateTable::canonical();
        let rebuilt = RateTable::new(
            canonical.bands().to_vec(),
            canonical.surcharge_per_100g(),
            5,
            2,
        )
        .expect("canonical table must satisfy invariants");
        assert_eq!(rebuilt, canonical);
        assert_eq!(canonical.ceiling_grams(), 1500);
    }

    #[test]
    fn express_priced_above_economy_in_every_band() {
        for band in RateTable::canonical().bands() {
            assert!(
                band.express_price > band.economy_price,
                "band {}-{}",
                band.min_grams,
                band.max_grams
            );
        }
    }

    #[test]
    fn lead_times_are_fixed_per_service() {
        let table = RateTable::canonical();
        assert_eq!(table.lead_time_days(ServiceLevel::Economy), 5);
        assert_eq!(table.lead_time_days(ServiceLevel::Express), 2);
    }

    // -----------------------------------------------------------------------
    // lookup
    // -----------------------------------------------------------------------

    #[test]
    fn lookup_minimum_parcel_matches_first_band() {
        let table = RateTable::canonical();
        let first = &table.bands()[0];
        let rates = table.lookup(300);
        assert_eq!(rates.economy_price, first.economy_price);
        assert_eq!(rates.express_price, first.express_price);
    }

    #[test]
    fn lookup_band_edges_are_inclusive() {
        let table = RateTable::canonical();
        assert_eq!(table.lookup(0).economy_price, cents(1999));
        assert_eq!(table.lookup(301).economy_price, cents(2049));
        assert_eq!(table.lookup(400).express_price, cents(2649));
        assert_eq!(table.lookup(1000).economy_price, cents(2949));
        assert_eq!(table.lookup(1001).economy_price, cents(3099));
        assert_eq!(table.lookup(1500).express_price, cents(4899));
    }

    #[test]
    fn lookup_above_ceiling_adds_linear_surcharge() {
        let rates = RateTable::canonical().lookup(2000);
        assert_eq!(rates.economy_price, cents(4699));
        assert_eq!(rates.express_price, cents(5899));
    }

    #[test]
    fn lookup_extrapolation_is_pro_rata() {
        let table = RateTable::canonical();
        assert_eq!(table.lookup(1501).economy_price, cents(3701));
        assert_eq!(table.lookup(1525).economy_price, cents(3749));
        assert_eq!(table.lookup(1550).express_price, cents(4999));
    }

    #[test]
    fn lookup_above_ceiling_is_strictly_greater() {
        let table = RateTable::canonical();
        let at_ceiling = table.lookup(1500);
        let above = table.lookup(2000);
        assert!(above.economy_price > at_ceiling.economy_price);
        assert!(above.express_price > at_ceiling.express_price);
    }

    #[test]
    fn lookup_extrapolation_increases_monotonically() {
        let table = RateTable::canonical();
        let mut previous = table.lookup(1500);
        for grams in (1600..=10_000).step_by(100) {
            let current = table.lookup(grams);
            assert!(current.economy_price > previous.economy_price, "{grams} g");
            assert!(current.express_price > previous.express_price, "{grams} g");
            previous = current;
        }
    }

    #[test]
    fn lookup_handles_maximum_weight() {
        let rates = RateTable::canonical().lookup(u32::MAX);
        assert!(rates.economy_price > cents(3699));
    }

    #[test]
    fn lookup_rounds_half_up_to_cents() {
        let table = RateTable::new(vec![band(0, 100, 1000, 1500)], cents(1), 3, 1).unwrap();
        // 50 g over the ceiling at R$ 0,01 per 100 g = R$ 0,005.
        assert_eq!(table.lookup(150).economy_price, cents(1001));
        assert_eq!(table.lookup(150).express_price, cents(1501));
    }

    #[test]
    fn lookup_prices_always_have_two_decimals() {
        let rates = RateTable::canonical().lookup(2000);
        assert_eq!(rates.economy_price.to_string(), "46.99");
        let table = RateTable::new(vec![band(0, 100, 1000, 1500)], cents(200), 3, 1).unwrap();
        assert_eq!(table.lookup(50).economy_price.to_string(), "10.00");
    }

    #[test]
    fn zero_surcharge_keeps_ceiling_price() {
        let table = RateTable::new(vec![band(0, 100, 1000, 1500)], Decimal::ZERO, 3, 1).unwrap();
        assert_eq!(table.lookup(5000).economy_price, cents(1000));
    }

    // -----------------------------------------------------------------------
    // validation
    // -----------------------------------------------------------------------

    #[test]
    fn rejects_empty_table() {
        let err = RateTable::new(vec![], cents(200), 5, 2).unwrap_err();
        assert!(matches!(err, RateTableError::Empty));
    }

    #[test]
    fn rejects_first_band_above_zero() {
        let err = RateTable::new(vec![band(1, 300, 1999, 2499)], cents(200), 5, 2).unwrap_err();
        assert!(matches!(err, RateTableError::FirstBandNotAtZero { min_grams: 1 }));
    }

    #[test]
    fn rejects_gap_between_bands() {
        let err = RateTable::new(
            vec![band(0, 300, 1999, 2499), band(350, 400, 2049, 2649)],
            cents(200),
            5,
            2,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RateTableError::NotContiguous {
                index: 1,
                expected_min: 301,
                found_min: 350
            }
        ));
    }

    #[test]
    fn rejects_overlapping_bands() {
        let err = RateTable::new(
            vec![band(0, 300, 1999, 2499), band(300, 400, 2049, 2649)],
            cents(200),
            5,
            2,
        )
        .unwrap_err();
        assert!(matches!(err, RateTableError::NotContiguous { index: 1, .. }));
    }

    #[test]
    fn rejects_inverted_band() {
        let err = RateTable::new(vec![band(0, 300, 1999, 2499), band(301, 200, 1, 2)], cents(200), 5, 2)
            .unwrap_err();
        assert!(matches!(err, RateTableError::InvertedBand { index: 1, .. }));
    }

    #[test]
    fn rejects_express_not_above_economy() {
        let err = RateTable::new(vec![band(0, 300, 2499, 2499)], cents(200), 5, 2).unwrap_err();
        assert!(matches!(err, RateTableError::ExpressNotAboveEconomy { index: 0 }));
    }

    #[test]
    fn rejects_negative_price() {
        let err = RateTable::new(vec![band(0, 300, -100, 2499)], cents(200), 5, 2).unwrap_err();
        assert!(matches!(err, RateTableError::NegativePrice { index: 0 }));
    }

    #[test]
    fn rejects_negative_surcharge() {
        let err = RateTable::new(vec![band(0, 300, 1999, 2499)], cents(-1), 5, 2).unwrap_err();
        assert!(matches!(err, RateTableError::NegativeSurcharge));
    }

    #[test]
    fn rejects_zero_lead_time() {
        let err = RateTable::new(vec![band(0, 300, 1999, 2499)], cents(200), 5, 0).unwrap_err();
        assert!(matches!(
            err,
            RateTableError::ZeroLeadTime {
                service: ServiceLevel::Express
            }
        ));
    }
}
