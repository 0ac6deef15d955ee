use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

/// One purchasable line of a cart, as handed over by the cart state provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Catalog identifier, used only to look up a declared weight.
    #[serde(default)]
    pub product_id: Option<Uuid>,
    /// Human-readable product name, e.g. `"Chá Verde - 100g"`.
    #[serde(alias = "name")]
    pub display_name: String,
    /// Weight attribute from the product record (`"250g"`, `"1kg"`, `"500ml"`).
    #[serde(default)]
    pub declared_weight: Option<String>,
    #[serde(alias = "qty")]
    pub quantity: u32,
}

impl CartLine {
    #[must_use]
    pub fn new(display_name: impl Into<String>, quantity: u32) -> Self {
        Self {
            product_id: None,
            display_name: display_name.into(),
            declared_weight: None,
            quantity,
        }
    }

    #[must_use]
    pub fn with_declared_weight(mut self, declared_weight: impl Into<String>) -> Self {
        self.declared_weight = Some(declared_weight.into());
        self
    }

    #[must_use]
    pub fn with_product_id(mut self, product_id: Uuid) -> Self {
        self.product_id = Some(product_id);
        self
    }
}

/// How the customer receives the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// In-person collection at the store; never charged.
    Pickup,
    Economy,
    Express,
}

impl DeliveryMode {
    /// The carrier service billed for this mode, `None` for pickup.
    #[must_use]
    pub fn service_level(self) -> Option<ServiceLevel> {
        match self {
            DeliveryMode::Pickup => None,
            DeliveryMode::Economy => Some(ServiceLevel::Economy),
            DeliveryMode::Express => Some(ServiceLevel::Express),
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryMode::Pickup => write!(f, "pickup"),
            DeliveryMode::Economy => write!(f, "economy"),
            DeliveryMode::Express => write!(f, "express"),
        }
    }
}

impl FromStr for DeliveryMode {
    type Err = CoreError;

    /// Accepts the canonical names plus the storefront's legacy identifiers
    /// (`retirada`, `pac`, `sedex`). Anything else is rejected so a typo can
    /// never silently bill the wrong service.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pickup" | "retirada" => Ok(DeliveryMode::Pickup),
            "economy" | "pac" => Ok(DeliveryMode::Economy),
            "express" | "sedex" => Ok(DeliveryMode::Express),
            _ => Err(CoreError::UnknownDeliveryMode(s.to_string())),
        }
    }
}

/// A carrier service level with its own price column in the rate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceLevel {
    Economy,
    Express,
}

impl ServiceLevel {
    /// Carrier product name shown on invoices.
    #[must_use]
    pub fn carrier_name(self) -> &'static str {
        match self {
            ServiceLevel::Economy => "PAC",
            ServiceLevel::Express => "SEDEX",
        }
    }
}

impl fmt::Display for ServiceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceLevel::Economy => write!(f, "economy"),
            ServiceLevel::Express => write!(f, "express"),
        }
    }
}
