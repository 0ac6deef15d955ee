use shipquote_core::{
    CartLine, CoreError, DeliveryMode, Destination, QuoteSet, ServiceLevel, ServiceQuote,
};

use crate::rate_card::RateCard;
use crate::rate_table::{RatePair, RateTable};
use crate::regional::RegionalPricing;
use crate::weight::{format_weight, total_weight};

/// Stateless shipping quote calculator.
///
/// Holds only the immutable rate card, so one instance can be shared across
/// threads and every call with the same inputs yields the same `QuoteSet`.
#[derive(Debug, Clone, Default)]
pub struct QuoteEngine {
    card: RateCard,
}

impl QuoteEngine {
    #[must_use]
    pub fn new(card: RateCard) -> Self {
        Self { card }
    }

    #[must_use]
    pub fn rate_table(&self) -> &RateTable {
        &self.card.table
    }

    #[must_use]
    pub fn regional(&self) -> Option<&RegionalPricing> {
        self.card.regional.as_ref()
    }

    /// Quotes both service levels for `lines`.
    ///
    /// Pickup short-circuits to a zero quote without weighing the cart. For
    /// shipped modes the destination only feeds the optional regional
    /// multiplier; without one the flat table price stands.
    #[must_use]
    pub fn quote(
        &self,
        lines: &[CartLine],
        mode: DeliveryMode,
        destination: Option<Destination>,
    ) -> QuoteSet {
        if mode == DeliveryMode::Pickup {
            return QuoteSet::pickup(destination);
        }

        let total_grams = total_weight(lines);
        let mut rates = self.card.table.lookup(total_grams);
        if let (Some(regional), Some(dest)) = (&self.card.regional, &destination) {
            let multiplier = regional.multiplier_for(&dest.state);
            rates = rates.map(|price| price * multiplier);
        }

        tracing::debug!(
            %mode,
            total_grams,
            economy = %rates.economy_price,
            express = %rates.express_price,
            "computed shipping quote"
        );

        QuoteSet {
            mode,
            total_grams,
            weight_label: format_weight(total_grams),
            economy: self.service_quote(&rates, ServiceLevel::Economy),
            express: self.service_quote(&rates, ServiceLevel::Express),
            destination,
        }
    }

    /// Like [`QuoteEngine::quote`], taking the mode as the caller's raw string.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownDeliveryMode`] if `mode` is not a
    /// recognised delivery mode.
    pub fn quote_for_mode(
        &self,
        lines: &[CartLine],
        mode: &str,
        destination: Option<Destination>,
    ) -> Result<QuoteSet, CoreError> {
        let mode: DeliveryMode = mode.parse()?;
        Ok(self.quote(lines, mode, destination))
    }

    fn service_quote(&self, rates: &RatePair, service: ServiceLevel) -> ServiceQuote {
        ServiceQuote {
            service,
            price: rates.price(service),
            lead_time_days: self.card.table.lead_time_days(service),
        }
    }
}
