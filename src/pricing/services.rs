//! Quote service: applies boundary requests to a fresh quote and prices it.
//!
//! The catalog is borrowed for the service's lifetime; each call builds its
//! own `QuoteState`, so nothing is shared between quotes.

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::calculators::{price_quote, QuoteBreakdown};
use super::catalog::Catalog;
use super::requests::QuoteRequest;
use super::responses::QuoteResponse;
use super::selection::{QuoteError, QuoteState};

/// Default currency for money values
pub const DEFAULT_CURRENCY: &str = "USD";

pub struct QuoteService<'a> {
    catalog: &'a Catalog,
    currency: String,
}

impl<'a> QuoteService<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self::with_currency(catalog, DEFAULT_CURRENCY)
    }

    pub fn with_currency(catalog: &'a Catalog, currency: &str) -> Self {
        Self {
            catalog,
            currency: currency.to_string(),
        }
    }

    /// Replay a request's selections in form order.
    ///
    /// Items are added with their package and installments, then the
    /// quote-wide payment plan, then the location. The first invalid
    /// selection aborts the whole request.
    pub fn build_state(&self, request: &QuoteRequest) -> Result<QuoteState, QuoteError> {
        let mut state = QuoteState::new();

        for item in &request.items {
            let index = state.add_entry(self.catalog, &item.area)?;
            if let Some(package) = &item.package {
                state.set_package_type(self.catalog, index, package)?;
            }
            if let Some(count) = item.installments {
                state.set_installment_count(index, count)?;
            }
        }

        if let Some(count) = request.payment_plan {
            state.set_payment_plan(count)?;
        }

        if let Some(location) = &request.location {
            state.set_location(self.catalog, location)?;
        }

        Ok(state)
    }

    /// Price a request without wrapping it for the wire.
    pub fn breakdown(&self, request: &QuoteRequest) -> Result<QuoteBreakdown, QuoteError> {
        let state = self.build_state(request)?;
        Ok(price_quote(&state))
    }

    #[instrument(skip_all, fields(items = request.items.len()))]
    pub fn quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, QuoteError> {
        let breakdown = self.breakdown(request)?;
        let quote_id = Uuid::new_v4();

        info!(
            %quote_id,
            stage = breakdown.stage.as_str(),
            subtotal = %breakdown.subtotal,
            tax = %breakdown.tax,
            total = %breakdown.total,
            "priced quote"
        );

        Ok(QuoteResponse::from_breakdown(
            breakdown,
            &self.currency,
            quote_id,
            Utc::now(),
        ))
    }
}
