//! Low-level parsing of weight and volume tokens such as `"100g"`, `"1,5 kg"`
//! or `"500ml"`.
//!
//! Parsing produces a tagged [`Measure`] so the unit conversion table lives in
//! one place ([`MassUnit::grams_factor`]) and can be tested without touching
//! the rate table. See [`crate::weight`] for how measures become cart weights.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Units recognised after a number. Volumes are shipped as their water
/// weight (1 ml ≈ 1 g).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MassUnit {
    Grams,
    Kilograms,
    Milliliters,
    Liters,
}

impl MassUnit {
    /// Accepted spellings in match order. Within a shared prefix the longer
    /// spelling comes first so `"gramas"` is not cut short at `"g"`.
    const SUFFIXES: [(&'static str, MassUnit); 15] = [
        ("quilos", MassUnit::Kilograms),
        ("quilo", MassUnit::Kilograms),
        ("kgs", MassUnit::Kilograms),
        ("kg", MassUnit::Kilograms),
        ("ml", MassUnit::Milliliters),
        ("gramas", MassUnit::Grams),
        ("grama", MassUnit::Grams),
        ("grs", MassUnit::Grams),
        ("gr", MassUnit::Grams),
        ("g", MassUnit::Grams),
        ("litros", MassUnit::Liters),
        ("litro", MassUnit::Liters),
        ("lts", MassUnit::Liters),
        ("lt", MassUnit::Liters),
        ("l", MassUnit::Liters),
    ];

    #[must_use]
    pub fn grams_factor(self) -> Decimal {
        match self {
            MassUnit::Grams | MassUnit::Milliliters => Decimal::ONE,
            MassUnit::Kilograms | MassUnit::Liters => Decimal::ONE_THOUSAND,
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            MassUnit::Grams => "g",
            MassUnit::Kilograms => "kg",
            MassUnit::Milliliters => "ml",
            MassUnit::Liters => "l",
        }
    }
}

/// A parsed numeric magnitude with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measure {
    pub magnitude: Decimal,
    pub unit: MassUnit,
}

impl Measure {
    #[must_use]
    pub fn new(magnitude: Decimal, unit: MassUnit) -> Self {
        Self { magnitude, unit }
    }

    /// Converts to whole grams, rounding half away from zero.
    ///
    /// Returns `None` for zero, negative, or absurdly large values; callers
    /// treat those like an unparseable token.
    #[must_use]
    pub fn to_grams(&self) -> Option<u32> {
        let grams = self
            .magnitude
            .checked_mul(self.unit.grams_factor())?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        if grams <= Decimal::ZERO {
            return None;
        }
        grams.to_u32()
    }
}

/// Finds the first `<number><optional spaces><unit>` token in `text`.
///
/// Matching rules (case-insensitive):
/// - the number is a run of digits with at most one `,` or `.` decimal
///   separator (`"1,5kg"`, `"0.75 l"`);
/// - a number not followed by a unit is skipped, so product codes such as
///   `"Kit 12 - 250g"` resolve to `250g`;
/// - the unit is a symbol (`g`, `kg`, `ml`, `l`) or a common long form
///   (`gr`, `gramas`, `kgs`, `quilos`, `lt`, `litros`);
/// - the unit must end at a word boundary, so `"10 lbs"` and
///   `"12 garrafas"` are not tokens.
///
/// Returns `None` when no token is found.
#[must_use]
pub fn scan_measure(text: &str) -> Option<Measure> {
    // ASCII lowering keeps byte offsets stable for the slices below.
    let lower = text.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let len = bytes.len();
    let mut i = 0usize;

    while i < len {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }

        let num_start = i;
        let mut has_separator = false;
        while i < len {
            let b = bytes[i];
            if b.is_ascii_digit() {
                i += 1;
            } else if (b == b'.' || b == b',')
                && !has_separator
                && i + 1 < len
                && bytes[i + 1].is_ascii_digit()
            {
                has_separator = true;
                i += 1;
            } else {
                break;
            }
        }
        let num_end = i;

        let mut scan = num_end;
        while scan < len && bytes[scan] == b' ' {
            scan += 1;
        }

        if let Some(unit) = match_unit(&bytes[scan..]) {
            if let Some(magnitude) = parse_magnitude(&lower[num_start..num_end]) {
                return Some(Measure::new(magnitude, unit));
            }
        }

        i = num_end;
    }
    None
}

/// Parses a product's declared weight attribute.
///
/// Accepts anything [`scan_measure`] accepts, plus a bare number
/// (`"250"`), which the product store uses for grams.
#[must_use]
pub fn parse_declared_weight(raw: &str) -> Option<Measure> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    scan_measure(trimmed)
        .or_else(|| parse_magnitude(trimmed).map(|m| Measure::new(m, MassUnit::Grams)))
}

/// Matches a unit suffix at the start of `rest`, requiring a word boundary
/// after it. Input must be pre-lowercased.
fn match_unit(rest: &[u8]) -> Option<MassUnit> {
    MassUnit::SUFFIXES
        .iter()
        .find(|(suffix, _)| {
            rest.starts_with(suffix.as_bytes()) && is_boundary(rest.get(suffix.len()).copied())
        })
        .map(|&(_, unit)| unit)
}

/// End of input or an ASCII non-alphanumeric byte. Non-ASCII bytes count as
/// letters so `"5 lá"` is not read as litres.
fn is_boundary(next: Option<u8>) -> bool {
    next.is_none_or(|b| b.is_ascii() && !b.is_ascii_alphanumeric())
}

fn parse_magnitude(num: &str) -> Option<Decimal> {
    Decimal::from_str(&num.replace(',', ".")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grams(text: &str) -> Option<u32> {
        scan_measure(text).and_then(|m| m.to_grams())
    }

    // -----------------------------------------------------------------------
    // scan_measure
    // -----------------------------------------------------------------------

    #[test]
    fn grams_suffix_no_space() {
        assert_eq!(
            scan_measure("Chá Verde - 100g"),
            Some(Measure::new(Decimal::from(100), MassUnit::Grams))
        );
    }

    #[test]
    fn grams_suffix_with_space() {
        assert_eq!(grams("Café 250 g"), Some(250));
    }

    #[test]
    fn kilograms_convert_to_grams() {
        assert_eq!(grams("Açúcar Mascavo 1kg"), Some(1000));
    }

    #[test]
    fn milliliters_weigh_as_grams() {
        assert_eq!(grams("Óleo - 500ml"), Some(500));
    }

    #[test]
    fn liters_convert_to_grams() {
        assert_eq!(grams("Kombucha 1 L"), Some(1000));
    }

    #[test]
    fn comma_decimal_separator() {
        assert_eq!(grams("Farinha 1,5kg"), Some(1500));
    }

    #[test]
    fn dot_decimal_separator() {
        assert_eq!(grams("Suco 0.75l"), Some(750));
    }

    #[test]
    fn case_insensitive_units() {
        assert_eq!(grams("Granola 500G"), Some(500));
        assert_eq!(grams("Arroz 2KG"), Some(2000));
        assert_eq!(grams("Leite 1ML"), Some(1));
    }

    #[test]
    fn skips_numbers_without_unit() {
        assert_eq!(grams("Chá 123 - 250g"), Some(250));
        assert_eq!(grams("Kit 2x100g"), Some(100));
    }

    #[test]
    fn first_unit_token_wins() {
        assert_eq!(grams("Mix 100g + 50g brinde"), Some(100));
    }

    #[test]
    fn unit_requires_word_boundary() {
        assert!(scan_measure("Peso 10 lbs").is_none());
        assert!(scan_measure("Caixa 12 garrafas").is_none());
        assert!(scan_measure("Kit 3 grampos").is_none());
        assert!(scan_measure("Pote 2 litrinhos").is_none());
    }

    #[test]
    fn gram_long_forms() {
        assert_eq!(grams("Café Torrado 500gr"), Some(500));
        assert_eq!(grams("Castanhas 200 grs"), Some(200));
        assert_eq!(grams("Sabonete 90 gramas"), Some(90));
        assert_eq!(grams("Fermento 1 grama"), Some(1));
    }

    #[test]
    fn kilogram_long_forms() {
        assert_eq!(grams("Arroz 5kgs"), Some(5000));
        assert_eq!(grams("Feijão 2 quilos"), Some(2000));
        assert_eq!(grams("Açúcar 1 Quilo"), Some(1000));
    }

    #[test]
    fn liter_long_forms() {
        assert_eq!(grams("Água 5 litros"), Some(5000));
        assert_eq!(grams("Suco 1 litro"), Some(1000));
        assert_eq!(grams("Leite 2lt"), Some(2000));
        assert_eq!(grams("Vinagre 1,5 lts"), Some(1500));
    }

    #[test]
    fn long_form_sets_the_unit() {
        assert_eq!(
            scan_measure("Feijão 2 quilos"),
            Some(Measure::new(Decimal::from(2), MassUnit::Kilograms))
        );
        assert_eq!(
            scan_measure("Água 5 litros").map(|m| m.unit),
            Some(MassUnit::Liters)
        );
    }

    #[test]
    fn unit_followed_by_punctuation_matches() {
        assert_eq!(grams("Mel (500g)"), Some(500));
        assert_eq!(grams("Azeite 500ml."), Some(500));
    }

    #[test]
    fn non_ascii_letter_after_unit_is_not_a_boundary() {
        assert!(scan_measure("Sabonete 3 lá").is_none());
    }

    #[test]
    fn no_token_returns_none() {
        assert!(scan_measure("Produto Sem Peso").is_none());
        assert!(scan_measure("").is_none());
    }

    #[test]
    fn trailing_separator_is_not_part_of_number() {
        assert_eq!(grams("Pacote 100.g"), None);
        assert_eq!(grams("Pacote 100, 200g"), Some(200));
    }

    // -----------------------------------------------------------------------
    // Measure::to_grams
    // -----------------------------------------------------------------------

    #[test]
    fn zero_weight_is_invalid() {
        assert_eq!(grams("Amostra 0g"), None);
    }

    #[test]
    fn fractional_grams_round_half_away_from_zero() {
        assert_eq!(grams("Erva 1,2345kg"), Some(1235));
        assert_eq!(grams("Erva 0,5g"), Some(1));
        assert_eq!(grams("Erva 0,4g"), None);
    }

    #[test]
    fn huge_weight_is_invalid() {
        assert_eq!(grams("Container 99999999kg"), None);
    }

    // -----------------------------------------------------------------------
    // parse_declared_weight
    // -----------------------------------------------------------------------

    #[test]
    fn declared_weight_with_unit() {
        assert_eq!(
            parse_declared_weight("1kg"),
            Some(Measure::new(Decimal::from(1), MassUnit::Kilograms))
        );
        assert_eq!(
            parse_declared_weight(" 500ml ").and_then(|m| m.to_grams()),
            Some(500)
        );
    }

    #[test]
    fn declared_weight_bare_number_is_grams() {
        assert_eq!(
            parse_declared_weight("250").and_then(|m| m.to_grams()),
            Some(250)
        );
        assert_eq!(
            parse_declared_weight("72,5").and_then(|m| m.to_grams()),
            Some(73)
        );
    }

    #[test]
    fn declared_weight_garbage_is_none() {
        assert!(parse_declared_weight("").is_none());
        assert!(parse_declared_weight("   ").is_none());
        assert!(parse_declared_weight("pesado").is_none());
    }

    #[test]
    fn unit_symbols() {
        assert_eq!(MassUnit::Kilograms.symbol(), "kg");
        assert_eq!(MassUnit::Liters.grams_factor(), Decimal::ONE_THOUSAND);
    }
}
