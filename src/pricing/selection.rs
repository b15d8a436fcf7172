//! Selection model: the customer's chosen areas, packages and payment plan.
//!
//! All writes go through `QuoteState` and are validated against the catalog
//! passed in by the caller. Reads never fail; see `calculators` for pricing.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::catalog::Catalog;
use super::models::{Location, PackageType};

/// Write-path validation failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuoteError {
    #[error("Unknown treatment area '{0}'")]
    UnknownArea(String),

    #[error("Unknown package type '{0}'")]
    UnknownPackageType(String),

    #[error("Unknown location '{0}'")]
    UnknownLocation(String),

    #[error("{count} installments is not available for {}", .package.as_deref().unwrap_or("an entry without a package"))]
    InvalidInstallmentCount {
        count: u32,
        package: Option<String>,
    },

    #[error("Entry index {index} is out of range ({len} entries)")]
    IndexOutOfRange { index: usize, len: usize },
}

impl QuoteError {
    /// Stable identifier used in error responses
    pub fn kind(&self) -> &'static str {
        match self {
            QuoteError::UnknownArea(_) => "unknown_area",
            QuoteError::UnknownPackageType(_) => "unknown_package_type",
            QuoteError::UnknownLocation(_) => "unknown_location",
            QuoteError::InvalidInstallmentCount { .. } => "invalid_installment_count",
            QuoteError::IndexOutOfRange { .. } => "index_out_of_range",
        }
    }
}

/// One treatment area on the quote
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionEntry {
    pub area: String,
    /// Category price captured when the area was added
    pub unit_price: Decimal,
    pub package: Option<PackageType>,
    pub installments: Option<u32>,
}

impl SelectionEntry {
    pub fn new(area: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            area: area.into(),
            unit_price,
            package: None,
            installments: None,
        }
    }

    pub fn is_priced(&self) -> bool {
        self.package.is_some()
    }
}

/// Where a quote stands in the form flow.
///
/// Stages are ordered; the presentation layer reveals the next input once the
/// current stage is reached. Pricing does not depend on the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum QuoteStage {
    Empty,
    HasAreas,
    AreasFullyPriced,
    PaymentPlanChosen,
    LocationChosen,
    QuoteComplete,
}

impl QuoteStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStage::Empty => "empty",
            QuoteStage::HasAreas => "has_areas",
            QuoteStage::AreasFullyPriced => "areas_fully_priced",
            QuoteStage::PaymentPlanChosen => "payment_plan_chosen",
            QuoteStage::LocationChosen => "location_chosen",
            QuoteStage::QuoteComplete => "quote_complete",
        }
    }
}

/// The in-progress quote for one session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteState {
    entries: Vec<SelectionEntry>,
    location: Option<Location>,
}

impl QuoteState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[SelectionEntry] {
        &self.entries
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// Append an area at its category's current price.
    pub fn add_entry(&mut self, catalog: &Catalog, area: &str) -> Result<usize, QuoteError> {
        let category = catalog.category_for(area).ok_or_else(|| {
            warn!(area, "rejected unknown treatment area");
            QuoteError::UnknownArea(area.to_string())
        })?;

        self.entries.push(SelectionEntry::new(area, category.base_price));
        let index = self.entries.len() - 1;
        debug!(index, area, price = %category.base_price, "added treatment area");
        Ok(index)
    }

    /// Remove an entry, keeping the order of the rest.
    pub fn remove_entry(&mut self, index: usize) -> Result<SelectionEntry, QuoteError> {
        self.check_index(index)?;
        let removed = self.entries.remove(index);
        debug!(index, area = %removed.area, "removed treatment area");
        Ok(removed)
    }

    /// Choose a package for an entry by name.
    ///
    /// An installment count the new package does not allow is cleared.
    pub fn set_package_type(
        &mut self,
        catalog: &Catalog,
        index: usize,
        package_name: &str,
    ) -> Result<(), QuoteError> {
        self.check_index(index)?;
        let package = catalog.package(package_name).ok_or_else(|| {
            warn!(package = package_name, "rejected unknown package type");
            QuoteError::UnknownPackageType(package_name.to_string())
        })?;

        let entry = &mut self.entries[index];
        if let Some(count) = entry.installments {
            if !package.allows_installments(count) {
                debug!(index, count, package = package_name, "cleared installments not allowed by package");
                entry.installments = None;
            }
        }
        entry.package = Some(package.clone());
        debug!(index, package = package_name, "set package type");
        Ok(())
    }

    /// Choose how many payments an entry is split into.
    pub fn set_installment_count(&mut self, index: usize, count: u32) -> Result<(), QuoteError> {
        self.check_index(index)?;
        let entry = &mut self.entries[index];
        match &entry.package {
            Some(package) if package.allows_installments(count) => {
                entry.installments = Some(count);
                debug!(index, count, "set installment count");
                Ok(())
            }
            package => {
                let package = package.as_ref().map(|p| p.name.clone());
                warn!(index, count, ?package, "rejected installment count");
                Err(QuoteError::InvalidInstallmentCount { count, package })
            }
        }
    }

    /// Apply one payment plan to every entry, or to none if any rejects it.
    ///
    /// On an empty quote there is nothing to reject, so this succeeds and
    /// changes nothing.
    pub fn set_payment_plan(&mut self, count: u32) -> Result<(), QuoteError> {
        if let Some(entry) = self
            .entries
            .iter()
            .find(|e| !e.package.as_ref().is_some_and(|p| p.allows_installments(count)))
        {
            let package = entry.package.as_ref().map(|p| p.name.clone());
            warn!(count, ?package, "rejected quote-wide payment plan");
            return Err(QuoteError::InvalidInstallmentCount { count, package });
        }

        for entry in &mut self.entries {
            entry.installments = Some(count);
        }
        debug!(count, entries = self.entries.len(), "set payment plan");
        Ok(())
    }

    pub fn set_location(&mut self, catalog: &Catalog, name: &str) -> Result<(), QuoteError> {
        let location = catalog.location(name).ok_or_else(|| {
            warn!(location = name, "rejected unknown location");
            QuoteError::UnknownLocation(name.to_string())
        })?;
        self.location = Some(location.clone());
        debug!(location = name, "set location");
        Ok(())
    }

    /// Every entry has a package, so the payment plan can be offered.
    pub fn is_ready_for_payment(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(SelectionEntry::is_priced)
    }

    /// Every entry has a payment plan, so the location can be offered.
    pub fn is_ready_for_location(&self) -> bool {
        self.is_ready_for_payment() && self.entries.iter().all(|e| e.installments.is_some())
    }

    pub fn is_complete(&self) -> bool {
        self.is_ready_for_location() && self.location.is_some()
    }

    /// Furthest form stage the quote has reached.
    ///
    /// `QuoteComplete` is only reported on a priced breakdown; a state with
    /// every input filled in stops at `LocationChosen`.
    pub fn stage(&self) -> QuoteStage {
        if self.entries.is_empty() {
            QuoteStage::Empty
        } else if !self.is_ready_for_payment() {
            QuoteStage::HasAreas
        } else if !self.is_ready_for_location() {
            QuoteStage::AreasFullyPriced
        } else if self.location.is_none() {
            QuoteStage::PaymentPlanChosen
        } else {
            QuoteStage::LocationChosen
        }
    }

    fn check_index(&self, index: usize) -> Result<(), QuoteError> {
        if index < self.entries.len() {
            Ok(())
        } else {
            warn!(index, len = self.entries.len(), "rejected out-of-range entry index");
            Err(QuoteError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn catalog() -> Catalog {
        Catalog::builtin()
    }

    // ==================== add/remove tests ====================

    #[test]
    fn test_add_entry_captures_category_price() {
        let catalog = catalog();
        let mut state = QuoteState::new();
        let index = state.add_entry(&catalog, "Full Back").unwrap();

        assert_eq!(index, 0);
        let entry = &state.entries()[0];
        assert_eq!(entry.area, "Full Back");
        assert_eq!(entry.unit_price, dec!(300));
        assert!(entry.package.is_none());
        assert!(entry.installments.is_none());
    }

    #[test]
    fn test_add_entry_unknown_area() {
        let catalog = catalog();
        let mut state = QuoteState::new();
        let err = state.add_entry(&catalog, "Elbow").unwrap_err();
        assert_eq!(err, QuoteError::UnknownArea("Elbow".to_string()));
        assert!(state.entries().is_empty());
    }

    #[test]
    fn test_unit_price_is_a_snapshot() {
        let mut catalog = catalog();
        let mut state = QuoteState::new();
        state.add_entry(&catalog, "Chin").unwrap();

        catalog.categories[0].base_price = dec!(99);
        state.add_entry(&catalog, "Chin").unwrap();

        assert_eq!(state.entries()[0].unit_price, dec!(75));
        assert_eq!(state.entries()[1].unit_price, dec!(99));
    }

    #[test]
    fn test_remove_entry_preserves_order() {
        let catalog = catalog();
        let mut state = QuoteState::new();
        for area in ["Chin", "Neck", "Full Face"] {
            state.add_entry(&catalog, area).unwrap();
        }

        let removed = state.remove_entry(1).unwrap();
        assert_eq!(removed.area, "Neck");
        let areas: Vec<&str> = state.entries().iter().map(|e| e.area.as_str()).collect();
        assert_eq!(areas, vec!["Chin", "Full Face"]);
    }

    #[test]
    fn test_remove_entry_out_of_range_leaves_state_unchanged() {
        let catalog = catalog();
        let mut state = QuoteState::new();
        state.add_entry(&catalog, "Chin").unwrap();
        let before = state.clone();

        let err = state.remove_entry(1).unwrap_err();
        assert_eq!(err, QuoteError::IndexOutOfRange { index: 1, len: 1 });
        assert_eq!(state, before);
    }

    // ==================== package/installment tests ====================

    #[test]
    fn test_set_package_type_unknown() {
        let catalog = catalog();
        let mut state = QuoteState::new();
        state.add_entry(&catalog, "Chin").unwrap();
        let err = state.set_package_type(&catalog, 0, "Standard 12").unwrap_err();
        assert_eq!(err, QuoteError::UnknownPackageType("Standard 12".to_string()));
        assert!(state.entries()[0].package.is_none());
    }

    #[test]
    fn test_set_package_type_bad_index() {
        let catalog = catalog();
        let mut state = QuoteState::new();
        assert_eq!(
            state.set_package_type(&catalog, 0, "Standard 6"),
            Err(QuoteError::IndexOutOfRange { index: 0, len: 0 })
        );
    }

    #[test]
    fn test_switch_to_touch_up_clears_six_installments() {
        let catalog = catalog();
        let mut state = QuoteState::new();
        state.add_entry(&catalog, "Chin").unwrap();
        state.set_package_type(&catalog, 0, "Standard 6").unwrap();
        state.set_installment_count(0, 6).unwrap();

        state.set_package_type(&catalog, 0, "Touch Up 3").unwrap();
        assert_eq!(state.entries()[0].installments, None);
        assert_eq!(state.entries()[0].package.as_ref().unwrap().name, "Touch Up 3");
    }

    #[test]
    fn test_switch_package_keeps_still_valid_installments() {
        let catalog = catalog();
        let mut state = QuoteState::new();
        state.add_entry(&catalog, "Chin").unwrap();
        state.set_package_type(&catalog, 0, "Standard 6").unwrap();
        state.set_installment_count(0, 2).unwrap();

        state.set_package_type(&catalog, 0, "Touch Up 3+1").unwrap();
        assert_eq!(state.entries()[0].installments, Some(2));
    }

    #[test]
    fn test_touch_up_rejects_six_installments() {
        let catalog = catalog();
        let mut state = QuoteState::new();
        state.add_entry(&catalog, "Chin").unwrap();
        state.set_package_type(&catalog, 0, "Touch Up 3").unwrap();

        let err = state.set_installment_count(0, 6).unwrap_err();
        assert_eq!(
            err,
            QuoteError::InvalidInstallmentCount {
                count: 6,
                package: Some("Touch Up 3".to_string()),
            }
        );
        assert_eq!(state.entries()[0].installments, None);
    }

    #[test]
    fn test_installments_require_package() {
        let catalog = catalog();
        let mut state = QuoteState::new();
        state.add_entry(&catalog, "Chin").unwrap();
        let err = state.set_installment_count(0, 1).unwrap_err();
        assert_eq!(err.kind(), "invalid_installment_count");
        assert!(err.to_string().contains("without a package"));
    }

    #[test]
    fn test_set_installment_count_bad_index() {
        let catalog = catalog();
        let mut state = QuoteState::new();
        assert_eq!(
            state.set_installment_count(0, 1),
            Err(QuoteError::IndexOutOfRange { index: 0, len: 0 })
        );

        state.add_entry(&catalog, "Chin").unwrap();
        state.set_package_type(&catalog, 0, "Standard 6").unwrap();
        let before = state.clone();
        assert_eq!(
            state.set_installment_count(1, 4),
            Err(QuoteError::IndexOutOfRange { index: 1, len: 1 })
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_set_payment_plan_on_empty_quote_is_noop() {
        let mut state = QuoteState::new();
        assert_eq!(state.set_payment_plan(6), Ok(()));
        assert!(state.entries().is_empty());
        assert_eq!(state.stage(), QuoteStage::Empty);
    }

    #[test]
    fn test_set_payment_plan_rejects_unpriced_entry() {
        let catalog = catalog();
        let mut state = QuoteState::new();
        state.add_entry(&catalog, "Chin").unwrap();
        assert_eq!(
            state.set_payment_plan(1),
            Err(QuoteError::InvalidInstallmentCount {
                count: 1,
                package: None,
            })
        );
    }

    #[test]
    fn test_set_payment_plan_is_all_or_nothing() {
        let catalog = catalog();
        let mut state = QuoteState::new();
        state.add_entry(&catalog, "Chin").unwrap();
        state.add_entry(&catalog, "Neck").unwrap();
        state.set_package_type(&catalog, 0, "Standard 6").unwrap();
        state.set_package_type(&catalog, 1, "Touch Up 3").unwrap();

        assert!(state.set_payment_plan(4).is_err());
        assert!(state.entries().iter().all(|e| e.installments.is_none()));

        state.set_payment_plan(2).unwrap();
        assert!(state.entries().iter().all(|e| e.installments == Some(2)));
    }

    #[test]
    fn test_set_location() {
        let catalog = catalog();
        let mut state = QuoteState::new();
        assert_eq!(
            state.set_location(&catalog, "Brooklyn"),
            Err(QuoteError::UnknownLocation("Brooklyn".to_string()))
        );
        assert!(state.location().is_none());

        state.set_location(&catalog, "Queens").unwrap();
        assert_eq!(state.location().unwrap().tax_rate, dec!(0.045));
    }

    // ==================== stage tests ====================

    #[test]
    fn test_stage_progression() {
        let catalog = catalog();
        let mut state = QuoteState::new();
        assert_eq!(state.stage(), QuoteStage::Empty);

        state.add_entry(&catalog, "Chin").unwrap();
        assert_eq!(state.stage(), QuoteStage::HasAreas);
        assert!(!state.is_ready_for_payment());

        state.set_package_type(&catalog, 0, "Unlimited").unwrap();
        assert_eq!(state.stage(), QuoteStage::AreasFullyPriced);
        assert!(state.is_ready_for_payment());

        state.set_installment_count(0, 4).unwrap();
        assert_eq!(state.stage(), QuoteStage::PaymentPlanChosen);
        assert!(state.is_ready_for_location());

        state.set_location(&catalog, "Long Island").unwrap();
        assert_eq!(state.stage(), QuoteStage::LocationChosen);
        assert!(state.is_complete());

        // adding an unpriced area drops back
        state.add_entry(&catalog, "Neck").unwrap();
        assert_eq!(state.stage(), QuoteStage::HasAreas);
    }

    #[test]
    fn test_location_before_areas_does_not_advance_stage() {
        let catalog = catalog();
        let mut state = QuoteState::new();
        state.set_location(&catalog, "Queens").unwrap();
        assert_eq!(state.stage(), QuoteStage::Empty);
        assert!(!state.is_complete());
    }
}
