use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::{DeliveryMode, ServiceLevel};
use crate::postal_code::PostalCode;

/// Price and lead time for one carrier service level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceQuote {
    pub service: ServiceLevel,
    /// Currency amount rounded to cents.
    pub price: Decimal,
    /// Business days until delivery. Zero only inside a pickup result.
    pub lead_time_days: u32,
}

impl ServiceQuote {
    #[must_use]
    pub fn zero(service: ServiceLevel) -> Self {
        Self {
            service,
            price: Decimal::ZERO,
            lead_time_days: 0,
        }
    }
}

/// A resolved delivery destination, used for display enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub postal_code: PostalCode,
    pub locality: String,
    /// Two-letter state code, e.g. `"SC"`.
    pub state: String,
}

impl Destination {
    /// `"Joinville, SC"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}, {}", self.locality, self.state)
    }
}

/// Result of one estimation call.
///
/// Both service quotes are always present so the checkout can show a
/// comparison; [`QuoteSet::selected`] picks the one to bill. A `QuoteSet` is
/// only valid for the cart it was computed from: any cart mutation requires
/// a fresh estimation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSet {
    pub mode: DeliveryMode,
    /// Clamped total weight the prices were looked up with; `0` for pickup.
    pub total_grams: u32,
    pub weight_label: String,
    pub economy: ServiceQuote,
    pub express: ServiceQuote,
    pub destination: Option<Destination>,
}

/// Shipping charge expressed as a payment-request line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingLineItem {
    pub title: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl QuoteSet {
    /// The zero-cost, zero-lead-time result for in-person collection.
    #[must_use]
    pub fn pickup(destination: Option<Destination>) -> Self {
        Self {
            mode: DeliveryMode::Pickup,
            total_grams: 0,
            weight_label: "0g".to_string(),
            economy: ServiceQuote::zero(ServiceLevel::Economy),
            express: ServiceQuote::zero(ServiceLevel::Express),
            destination,
        }
    }

    /// Quote for a specific service level.
    #[must_use]
    pub fn service(&self, service: ServiceLevel) -> &ServiceQuote {
        match service {
            ServiceLevel::Economy => &self.economy,
            ServiceLevel::Express => &self.express,
        }
    }

    /// The quote matching the requested mode, `None` for pickup.
    #[must_use]
    pub fn selected(&self) -> Option<&ServiceQuote> {
        self.mode.service_level().map(|s| self.service(s))
    }

    /// Amount to bill for shipping.
    #[must_use]
    pub fn price(&self) -> Decimal {
        self.selected().map_or(Decimal::ZERO, |q| q.price)
    }

    #[must_use]
    pub fn lead_time_days(&self) -> u32 {
        self.selected().map_or(0, |q| q.lead_time_days)
    }

    /// Line item for the payment request, `None` when nothing is charged.
    #[must_use]
    pub fn line_item(&self) -> Option<ShippingLineItem> {
        let quote = self.selected()?;
        if quote.price <= Decimal::ZERO {
            return None;
        }
        Some(ShippingLineItem {
            title: format!("Frete {}", quote.service.carrier_name()),
            unit_price: quote.price,
            quantity: 1,
        })
    }
}
