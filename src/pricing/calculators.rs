//! Core pricing calculation functions.
//!
//! Pure functions for quote math - no logging, no catalog access. Every money
//! value leaving this module is rounded to cents.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use crate::pricing::models::{Location, PricingRule};
use crate::pricing::selection::{QuoteStage, QuoteState, SelectionEntry};

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// Banker's rounding rounds to the nearest even number when the value is exactly
/// halfway between two possibilities. This reduces cumulative rounding bias.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use laser_quote::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(2));   // rounds to even
/// assert_eq!(round_money(dec!(3.5), 0), dec!(4));   // rounds to even
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

fn cents(amount: Decimal) -> Decimal {
    round_money(amount, 2)
}

/// Price every entry in one pass.
///
/// Returns one total per entry, in selection order. Entries without a package
/// total zero. Entries sharing a buy-one-get-one package are priced jointly:
/// the highest unit price (first one on ties) pays full price and every other
/// entry on that package pays `1 - discount` of its own full price.
pub fn entry_totals(entries: &[SelectionEntry]) -> Vec<Decimal> {
    let mut totals: Vec<Decimal> = entries
        .iter()
        .map(|entry| match &entry.package {
            None => Decimal::ZERO,
            Some(package) => {
                let sessions = Decimal::from(package.session_count);
                match &package.rule {
                    PricingRule::FlatMultiplier { multiplier } => {
                        entry.unit_price * Decimal::from(*multiplier)
                    }
                    PricingRule::PercentDiscount { discount } => {
                        entry.unit_price * sessions * (Decimal::ONE - *discount)
                    }
                    // full price until the joint pass below
                    PricingRule::BuyOneGetOne { .. } => entry.unit_price * sessions,
                }
            }
        })
        .collect();

    // Group buy-one-get-one entries by package name, keeping selection order
    let mut groups: Vec<(&str, Decimal, Vec<usize>)> = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        let Some(package) = &entry.package else {
            continue;
        };
        let PricingRule::BuyOneGetOne { discount } = &package.rule else {
            continue;
        };
        match groups.iter().position(|(name, _, _)| *name == package.name) {
            Some(group) => groups[group].2.push(index),
            None => groups.push((package.name.as_str(), *discount, vec![index])),
        }
    }

    for (_, discount, mut members) in groups {
        if members.len() < 2 {
            continue;
        }
        // stable: the earliest of equally priced entries stays first
        members.sort_by(|a, b| entries[*b].unit_price.cmp(&entries[*a].unit_price));
        for &index in &members[1..] {
            totals[index] *= Decimal::ONE - discount;
        }
    }

    totals.into_iter().map(cents).collect()
}

/// Total for the entry at `index`, priced against the whole selection.
pub fn entry_total(entries: &[SelectionEntry], index: usize) -> Decimal {
    entry_totals(entries)
        .get(index)
        .copied()
        .unwrap_or(Decimal::ZERO)
}

/// Package total spread over the sessions it includes.
pub fn price_per_treatment(entries: &[SelectionEntry], index: usize) -> Decimal {
    match entries.get(index).and_then(|e| e.package.as_ref()) {
        Some(package) => per_treatment(entry_total(entries, index), package.session_count),
        None => Decimal::ZERO,
    }
}

/// One installment of the entry at `index`; zero until a plan is chosen.
pub fn payment_amount(entries: &[SelectionEntry], index: usize) -> Decimal {
    match entries.get(index).and_then(|e| e.installments) {
        Some(count) => per_payment(entry_total(entries, index), count),
        None => Decimal::ZERO,
    }
}

fn per_treatment(total: Decimal, session_count: u32) -> Decimal {
    if session_count == 0 {
        return Decimal::ZERO;
    }
    cents(total / Decimal::from(session_count))
}

fn per_payment(total: Decimal, installments: u32) -> Decimal {
    if installments == 0 {
        return Decimal::ZERO;
    }
    cents(total / Decimal::from(installments))
}

pub fn subtotal(entries: &[SelectionEntry]) -> Decimal {
    entry_totals(entries).into_iter().sum()
}

/// Sales tax on `subtotal`; zero until a location is chosen.
pub fn tax(subtotal: Decimal, location: Option<&Location>) -> Decimal {
    match location {
        Some(location) => cents(subtotal * location.tax_rate),
        None => Decimal::ZERO,
    }
}

pub fn grand_total(entries: &[SelectionEntry], location: Option<&Location>) -> Decimal {
    let subtotal = subtotal(entries);
    subtotal + tax(subtotal, location)
}

/// Split `total` into `count` cent amounts that sum back to `total`.
///
/// Uses banker's rounding for the base installment, then distributes any
/// remainder in 0.01 increments to the earliest installments.
pub fn allocate_installments(total: Decimal, count: u32) -> Vec<Decimal> {
    if count == 0 {
        return vec![];
    }

    let per_payment = cents(total / Decimal::from(count));
    let remainder = total - per_payment * Decimal::from(count);

    let mut amounts = vec![per_payment; count as usize];

    // Distribute remainder in 0.01 increments to first N payments
    if remainder != Decimal::ZERO {
        let increment = if remainder > Decimal::ZERO {
            Decimal::new(1, 2) // 0.01
        } else {
            Decimal::new(-1, 2) // -0.01
        };

        let adjustments_needed = (remainder.abs() / Decimal::new(1, 2))
            .to_usize()
            .unwrap_or(0);

        for amount in amounts.iter_mut().take(adjustments_needed) {
            *amount += increment;
        }
    }

    amounts
}

/// Priced figures for one entry
#[derive(Debug, Clone, PartialEq)]
pub struct LineBreakdown {
    pub area: String,
    pub unit_price: Decimal,
    pub package: Option<String>,
    pub session_count: Option<u32>,
    pub installments: Option<u32>,
    pub total: Decimal,
    pub price_per_treatment: Decimal,
    pub payment_amount: Decimal,
}

/// Quote-wide payment schedule
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSchedule {
    pub installments: u32,
    /// Grand total split into cents; sums exactly to the grand total
    pub amounts: Vec<Decimal>,
}

/// Everything the presentation layer shows for a quote
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteBreakdown {
    pub stage: QuoteStage,
    pub lines: Vec<LineBreakdown>,
    pub subtotal: Decimal,
    pub location: Option<String>,
    pub tax_rate: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    /// Present only when every entry uses the same installment count
    pub payment_schedule: Option<PaymentSchedule>,
}

impl QuoteBreakdown {
    pub fn is_complete(&self) -> bool {
        self.stage == QuoteStage::QuoteComplete
    }
}

/// Price a whole quote in one pass.
pub fn price_quote(state: &QuoteState) -> QuoteBreakdown {
    let entries = state.entries();
    let totals = entry_totals(entries);

    let lines: Vec<LineBreakdown> = entries
        .iter()
        .zip(&totals)
        .map(|(entry, &total)| {
            let session_count = entry.package.as_ref().map(|p| p.session_count);
            LineBreakdown {
                area: entry.area.clone(),
                unit_price: entry.unit_price,
                package: entry.package.as_ref().map(|p| p.name.clone()),
                session_count,
                installments: entry.installments,
                total,
                price_per_treatment: session_count
                    .map(|s| per_treatment(total, s))
                    .unwrap_or(Decimal::ZERO),
                payment_amount: entry
                    .installments
                    .map(|n| per_payment(total, n))
                    .unwrap_or(Decimal::ZERO),
            }
        })
        .collect();

    let subtotal: Decimal = totals.iter().sum();
    let location = state.location();
    let tax = tax(subtotal, location);
    let total = subtotal + tax;

    let payment_schedule = match entries.first().and_then(|e| e.installments) {
        Some(count) if entries.iter().all(|e| e.installments == Some(count)) => {
            Some(PaymentSchedule {
                installments: count,
                amounts: allocate_installments(total, count),
            })
        }
        _ => None,
    };

    let stage = match state.stage() {
        QuoteStage::LocationChosen => QuoteStage::QuoteComplete,
        stage => stage,
    };

    QuoteBreakdown {
        stage,
        lines,
        subtotal,
        location: location.map(|l| l.name.clone()),
        tax_rate: location.map(|l| l.tax_rate).unwrap_or(Decimal::ZERO),
        tax,
        total,
        payment_schedule,
    }
}
