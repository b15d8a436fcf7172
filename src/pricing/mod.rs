//! Pricing engine for laser hair-removal package quotes.
//!
//! Catalog data is loaded once and passed by reference; the selection model
//! validates writes; the calculators price any selection without failing.

pub mod calculators;
pub mod catalog;
pub mod models;
pub mod requests;
pub mod responses;
pub mod selection;
pub mod services;

// Re-export commonly used items
pub use calculators::{price_quote, round_money, QuoteBreakdown};
pub use catalog::{Catalog, CatalogError};
pub use models::{Location, PackageType, PaymentOption, PricingRule, TreatmentCategory};
pub use selection::{QuoteError, QuoteStage, QuoteState, SelectionEntry};
pub use services::QuoteService;
