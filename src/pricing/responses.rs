//! Response DTOs for the quote boundary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::calculators::{LineBreakdown, PaymentSchedule, QuoteBreakdown};
use super::selection::QuoteError;

/// Money value for JSON responses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoneyResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
}

impl MoneyResponse {
    /// Always carries two fraction digits, e.g. `45.00`
    pub fn new(amount: Decimal, currency: &str) -> Self {
        let mut amount = amount.round_dp(2);
        amount.rescale(2);
        Self {
            amount,
            currency: currency.to_string(),
        }
    }
}

/// Priced line in the quote response
#[derive(Debug, Serialize)]
pub struct QuoteLineResponse {
    pub area: String,
    pub unit_price: MoneyResponse,
    pub package: Option<String>,
    pub session_count: Option<u32>,
    pub installments: Option<u32>,
    pub total: MoneyResponse,
    pub price_per_treatment: MoneyResponse,
    pub payment_amount: MoneyResponse,
}

impl QuoteLineResponse {
    fn from_line(line: LineBreakdown, currency: &str) -> Self {
        Self {
            area: line.area,
            unit_price: MoneyResponse::new(line.unit_price, currency),
            package: line.package,
            session_count: line.session_count,
            installments: line.installments,
            total: MoneyResponse::new(line.total, currency),
            price_per_treatment: MoneyResponse::new(line.price_per_treatment, currency),
            payment_amount: MoneyResponse::new(line.payment_amount, currency),
        }
    }
}

/// Quote-wide payment schedule in the response
#[derive(Debug, Serialize)]
pub struct PaymentScheduleResponse {
    pub installments: u32,
    pub amounts: Vec<MoneyResponse>,
}

impl PaymentScheduleResponse {
    fn from_schedule(schedule: PaymentSchedule, currency: &str) -> Self {
        Self {
            installments: schedule.installments,
            amounts: schedule
                .amounts
                .into_iter()
                .map(|amount| MoneyResponse::new(amount, currency))
                .collect(),
        }
    }
}

/// Response for a priced quote
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub quote_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub stage: &'static str,
    pub complete: bool,
    pub lines: Vec<QuoteLineResponse>,
    pub subtotal: MoneyResponse,
    pub location: Option<String>,
    #[serde(with = "rust_decimal::serde::str")]
    pub tax_rate: Decimal,
    pub tax: MoneyResponse,
    pub total: MoneyResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_schedule: Option<PaymentScheduleResponse>,
}

impl QuoteResponse {
    pub fn from_breakdown(
        breakdown: QuoteBreakdown,
        currency: &str,
        quote_id: Uuid,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let complete = breakdown.is_complete();
        Self {
            quote_id,
            generated_at,
            stage: breakdown.stage.as_str(),
            complete,
            lines: breakdown
                .lines
                .into_iter()
                .map(|line| QuoteLineResponse::from_line(line, currency))
                .collect(),
            subtotal: MoneyResponse::new(breakdown.subtotal, currency),
            location: breakdown.location,
            tax_rate: breakdown.tax_rate,
            tax: MoneyResponse::new(breakdown.tax, currency),
            total: MoneyResponse::new(breakdown.total, currency),
            payment_schedule: breakdown
                .payment_schedule
                .map(|s| PaymentScheduleResponse::from_schedule(s, currency)),
        }
    }
}

/// Generic quote error response
#[derive(Debug, Serialize)]
pub struct QuoteErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&QuoteError> for QuoteErrorResponse {
    fn from(err: &QuoteError) -> Self {
        let details = match err {
            QuoteError::InvalidInstallmentCount { count, package } => {
                Some(serde_json::json!({ "count": count, "package": package }))
            }
            QuoteError::IndexOutOfRange { index, len } => {
                Some(serde_json::json!({ "index": index, "len": len }))
            }
            _ => None,
        };
        Self {
            error_type: err.kind().to_string(),
            message: err.to_string(),
            details,
        }
    }
}
