//! Catalog lookups and the built-in price list.
//!
//! A `Catalog` is built once at startup (built-in or from JSON), validated,
//! and then passed by reference into the selection model and pricing code.

use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::models::{Location, PackageType, PaymentOption, PricingRule, TreatmentCategory};

/// Installment counts allowed on full packages
const FULL_INSTALLMENTS: &[u32] = &[1, 2, 4, 6];

/// Touch-up packages cap the payment plan at two installments
const TOUCH_UP_INSTALLMENTS: &[u32] = &[1, 2];

/// Catalog configuration errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Area '{area}' is listed in both '{first}' and '{second}'")]
    DuplicateArea {
        area: String,
        first: String,
        second: String,
    },

    #[error("Duplicate {kind} name '{name}'")]
    DuplicateName { kind: &'static str, name: String },

    #[error("Invalid catalog value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Static reference data for quoting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub categories: Vec<TreatmentCategory>,
    pub packages: Vec<PackageType>,
    pub locations: Vec<Location>,
    pub payment_options: Vec<PaymentOption>,
}

impl Catalog {
    /// Build a catalog, rejecting data that breaks lookup invariants.
    pub fn new(
        categories: Vec<TreatmentCategory>,
        packages: Vec<PackageType>,
        locations: Vec<Location>,
        payment_options: Vec<PaymentOption>,
    ) -> Result<Self, CatalogError> {
        let catalog = Self {
            categories,
            packages,
            locations,
            payment_options,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The price list used by the studio's quote form.
    pub fn builtin() -> Self {
        Self {
            categories: vec![
                category(
                    "Extra Small",
                    dec!(75.00),
                    &[
                        "Cheeks",
                        "Chin",
                        "Ears",
                        "Eyebrow (Between Brows)",
                        "Hairline",
                        "Hands",
                        "Lip (Lower or Upper)",
                        "Nipple",
                        "Sideburns",
                        "Stomach Strip",
                        "Toes",
                    ],
                ),
                category(
                    "Small",
                    dec!(125.00),
                    &[
                        "Back (Upper)",
                        "Back (Mid)",
                        "Back (Lower)",
                        "Bikini Line",
                        "Butt Strip",
                        "Chest Strip",
                        "Inner Thigh",
                        "Neck",
                        "Stomach (Full)",
                        "Underarms",
                    ],
                ),
                category(
                    "Medium",
                    dec!(200.00),
                    &[
                        "Arms (Half)",
                        "Bikini Brazilian",
                        "Bikini Full",
                        "Full Butt",
                        "Full Face",
                        "Leg Upper",
                        "Leg Lower",
                        "Shoulders",
                    ],
                ),
                category(
                    "Large",
                    dec!(300.00),
                    &["Full Chest", "Full Arms", "Full Back", "Full Legs"],
                ),
            ],
            packages: vec![
                package(
                    "Standard 6",
                    6,
                    PricingRule::FlatMultiplier { multiplier: 6 },
                    FULL_INSTALLMENTS,
                ),
                package(
                    "6+1 Standard",
                    7,
                    PricingRule::FlatMultiplier { multiplier: 6 },
                    FULL_INSTALLMENTS,
                ),
                package(
                    "Unlimited",
                    12,
                    PricingRule::PercentDiscount { discount: dec!(0.25) },
                    FULL_INSTALLMENTS,
                ),
                package(
                    "Touch Up 3",
                    3,
                    PricingRule::FlatMultiplier { multiplier: 3 },
                    TOUCH_UP_INSTALLMENTS,
                ),
                package(
                    "Touch Up 3+1",
                    4,
                    PricingRule::FlatMultiplier { multiplier: 3 },
                    TOUCH_UP_INSTALLMENTS,
                ),
                package(
                    "BOGO 20",
                    6,
                    PricingRule::BuyOneGetOne { discount: dec!(0.20) },
                    FULL_INSTALLMENTS,
                ),
            ],
            locations: vec![
                Location {
                    name: "Queens".to_string(),
                    tax_rate: dec!(0.045),
                },
                Location {
                    name: "Long Island".to_string(),
                    tax_rate: Decimal::ZERO,
                },
            ],
            payment_options: FULL_INSTALLMENTS
                .iter()
                .map(|&installments| PaymentOption {
                    installments,
                    label: if installments == 1 {
                        "Upfront".to_string()
                    } else {
                        format!("{} installments", installments)
                    },
                })
                .collect(),
        }
    }

    /// Parse and validate a catalog from JSON text.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Category that owns `area`, or `None` for any name not in the catalog.
    pub fn category_for(&self, area: &str) -> Option<&TreatmentCategory> {
        self.categories.iter().find(|c| c.contains(area))
    }

    pub fn package(&self, name: &str) -> Option<&PackageType> {
        self.packages.iter().find(|p| p.name == name)
    }

    pub fn location(&self, name: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.name == name)
    }

    /// Payment options the customer may pick for `package`, in display order.
    pub fn payment_options_for(&self, package: &PackageType) -> Vec<&PaymentOption> {
        self.payment_options
            .iter()
            .filter(|o| package.allows_installments(o.installments))
            .collect()
    }

    /// Check the invariants every lookup relies on.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut owners: Vec<(&str, &str)> = Vec::new();
        let mut category_names = HashSet::new();
        for category in &self.categories {
            if !category_names.insert(category.name.as_str()) {
                return Err(CatalogError::DuplicateName {
                    kind: "category",
                    name: category.name.clone(),
                });
            }
            if category.base_price < Decimal::ZERO {
                return Err(invalid(
                    format!("categories.{}.base_price", category.name),
                    "price cannot be negative",
                ));
            }
            for area in &category.areas {
                if let Some((_, first)) = owners.iter().find(|(a, _)| *a == area.as_str()) {
                    return Err(CatalogError::DuplicateArea {
                        area: area.clone(),
                        first: first.to_string(),
                        second: category.name.clone(),
                    });
                }
                owners.push((area.as_str(), category.name.as_str()));
            }
        }

        let mut package_names = HashSet::new();
        for package in &self.packages {
            if !package_names.insert(package.name.as_str()) {
                return Err(CatalogError::DuplicateName {
                    kind: "package",
                    name: package.name.clone(),
                });
            }
            if package.session_count == 0 {
                return Err(invalid(
                    format!("packages.{}.session_count", package.name),
                    "must be greater than zero",
                ));
            }
            if package.installment_options.is_empty()
                || package.installment_options.contains(&0)
            {
                return Err(invalid(
                    format!("packages.{}.installment_options", package.name),
                    "must list at least one non-zero installment count",
                ));
            }
            match &package.rule {
                PricingRule::FlatMultiplier { multiplier } if *multiplier == 0 => {
                    return Err(invalid(
                        format!("packages.{}.rule.multiplier", package.name),
                        "must be greater than zero",
                    ));
                }
                PricingRule::PercentDiscount { discount }
                | PricingRule::BuyOneGetOne { discount }
                    if *discount < Decimal::ZERO || *discount >= Decimal::ONE =>
                {
                    return Err(invalid(
                        format!("packages.{}.rule.discount", package.name),
                        "must be in [0, 1)",
                    ));
                }
                _ => {}
            }
        }

        let mut location_names = HashSet::new();
        for location in &self.locations {
            if !location_names.insert(location.name.as_str()) {
                return Err(CatalogError::DuplicateName {
                    kind: "location",
                    name: location.name.clone(),
                });
            }
            if location.tax_rate < Decimal::ZERO {
                return Err(invalid(
                    format!("locations.{}.tax_rate", location.name),
                    "cannot be negative",
                ));
            }
        }

        if self.payment_options.iter().any(|o| o.installments == 0) {
            return Err(invalid(
                "payment_options".to_string(),
                "installment count must be greater than zero",
            ));
        }

        // every installment count a package allows must be offered somewhere
        for package in &self.packages {
            if let Some(count) = package
                .installment_options
                .iter()
                .find(|&&n| !self.payment_options.iter().any(|o| o.installments == n))
            {
                return Err(invalid(
                    format!("packages.{}.installment_options", package.name),
                    &format!("{} installments has no payment option", count),
                ));
            }
        }

        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn category(name: &str, base_price: Decimal, areas: &[&str]) -> TreatmentCategory {
    TreatmentCategory {
        name: name.to_string(),
        base_price,
        areas: areas.iter().map(|a| a.to_string()).collect(),
    }
}

fn package(name: &str, session_count: u32, rule: PricingRule, options: &[u32]) -> PackageType {
    PackageType {
        name: name.to_string(),
        session_count,
        rule,
        installment_options: options.to_vec(),
    }
}

fn invalid(field: String, reason: &str) -> CatalogError {
    CatalogError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
}
