//! Cart weight extraction.
//!
//! A line's per-unit weight comes from, in order: the product's declared
//! weight attribute, a weight token in its display name, then
//! [`DEFAULT_UNIT_GRAMS`]. Extraction never fails.

use rust_decimal::{Decimal, RoundingStrategy};
use shipquote_core::CartLine;

use crate::measure::{parse_declared_weight, scan_measure};

/// Per-unit weight assumed when nothing usable can be parsed.
pub const DEFAULT_UNIT_GRAMS: u32 = 100;

/// Smallest parcel the carrier prices; lighter carts are billed as this.
pub const MIN_PARCEL_GRAMS: u32 = 300;

/// Per-unit weight of a cart line in grams.
#[must_use]
pub fn unit_weight(line: &CartLine) -> u32 {
    if let Some(grams) = line
        .declared_weight
        .as_deref()
        .and_then(parse_declared_weight)
        .and_then(|m| m.to_grams())
    {
        return grams;
    }

    if let Some(grams) = scan_measure(&line.display_name).and_then(|m| m.to_grams()) {
        return grams;
    }

    tracing::debug!(
        name = %line.display_name,
        declared_weight = ?line.declared_weight,
        default_grams = DEFAULT_UNIT_GRAMS,
        "no usable weight for cart line; using default"
    );
    DEFAULT_UNIT_GRAMS
}

/// Weight of a cart line in grams: per-unit weight times quantity.
#[must_use]
pub fn extract_weight(line: &CartLine) -> u32 {
    unit_weight(line).saturating_mul(line.quantity)
}

/// Unclamped sum of every line's weight.
#[must_use]
pub fn raw_weight(lines: &[CartLine]) -> u32 {
    lines
        .iter()
        .map(extract_weight)
        .fold(0u32, u32::saturating_add)
}

/// Shippable cart weight: the raw sum, raised to [`MIN_PARCEL_GRAMS`].
#[must_use]
pub fn total_weight(lines: &[CartLine]) -> u32 {
    raw_weight(lines).max(MIN_PARCEL_GRAMS)
}

/// Human-readable weight: `"850g"` below one kilogram, otherwise kilograms
/// with one decimal (`"1.0kg"`, `"1.6kg"` for 1550 g).
#[must_use]
pub fn format_weight(grams: u32) -> String {
    if grams < 1000 {
        return format!("{grams}g");
    }
    let mut kg = (Decimal::from(grams) / Decimal::ONE_THOUSAND)
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    kg.rescale(1);
    format!("{kg}kg")
}
