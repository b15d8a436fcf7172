//! Catalog data types for quote pricing.
//!
//! These are immutable reference data. They derive serde so a catalog can be
//! loaded from JSON at startup and echoed back to the presentation layer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Treatment-area category (Extra Small, Small, ...) with its base price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentCategory {
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub base_price: Decimal,
    pub areas: Vec<String>,
}

impl TreatmentCategory {
    pub fn contains(&self, area: &str) -> bool {
        self.areas.iter().any(|a| a == area)
    }
}

/// How a package turns a per-session unit price into a package total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PricingRule {
    /// Charge `unit_price × multiplier` regardless of sessions included.
    FlatMultiplier { multiplier: u32 },
    /// Charge `unit_price × sessions × (1 - discount)`.
    PercentDiscount {
        #[serde(with = "rust_decimal::serde::str")]
        discount: Decimal,
    },
    /// Joint pricing across every entry on the same package: the most
    /// expensive entry pays full price, each other one gets `discount` off.
    BuyOneGetOne {
        #[serde(with = "rust_decimal::serde::str")]
        discount: Decimal,
    },
}

/// Package type offered for a treatment area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageType {
    pub name: String,
    pub session_count: u32,
    pub rule: PricingRule,
    /// Installment counts a customer may pick for this package
    pub installment_options: Vec<u32>,
}

impl PackageType {
    pub fn allows_installments(&self, count: u32) -> bool {
        self.installment_options.contains(&count)
    }
}

/// Studio location and the sales tax charged there
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub tax_rate: Decimal,
}

/// Payment-plan option shown to the customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentOption {
    pub installments: u32,
    pub label: String,
}
