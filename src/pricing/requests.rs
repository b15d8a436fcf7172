//! Request DTOs for the quote boundary.

use serde::Deserialize;

/// A full set of form selections to price
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub items: Vec<QuoteItemRequest>,
    /// Quote-wide payment plan, applied after per-item installments
    #[serde(default)]
    pub payment_plan: Option<u32>,
    #[serde(default)]
    pub location: Option<String>,
}

/// One treatment area in the request
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteItemRequest {
    pub area: String,
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub installments: Option<u32>,
}
