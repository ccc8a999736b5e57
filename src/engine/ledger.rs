//! Credits and weight accounting.
//!
//! Pure functions only: nothing here touches a [`SheetState`](super::types::SheetState)
//! directly. The dispatcher calls them once per action and stores the result.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::errors::ActionError;
use super::types::Container;
use crate::validation::coerce_amount;

const MINOR_PER_CREDIT: i64 = 100;

/// Credit amount stored as integer hundredths.
///
/// Serialized as a plain number (`12.5`) so callers see the same shape they send.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Credits {
    minor_units: i64,
}

impl Credits {
    pub const ZERO: Credits = Credits { minor_units: 0 };

    pub fn from_minor(minor_units: i64) -> Self {
        Self { minor_units }
    }

    pub fn whole(credits: i64) -> Self {
        Self::from_minor(credits.saturating_mul(MINOR_PER_CREDIT))
    }

    /// Round a decimal amount to the nearest hundredth. Non-finite input is zero.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() {
            return Self::ZERO;
        }
        let minor = (value * MINOR_PER_CREDIT as f64).round();
        Self::from_minor(minor.clamp(i64::MIN as f64, i64::MAX as f64) as i64)
    }

    pub fn minor_units(&self) -> i64 {
        self.minor_units
    }

    pub fn as_f64(&self) -> f64 {
        self.minor_units as f64 / MINOR_PER_CREDIT as f64
    }

    pub fn is_negative(&self) -> bool {
        self.minor_units < 0
    }

    pub fn times(&self, quantity: u32) -> Self {
        Self::from_minor(self.minor_units.saturating_mul(i64::from(quantity)))
    }

    pub fn saturating_add(&self, other: Credits) -> Self {
        Self::from_minor(self.minor_units.saturating_add(other.minor_units))
    }

    pub fn saturating_sub(&self, other: Credits) -> Self {
        Self::from_minor(self.minor_units.saturating_sub(other.minor_units))
    }
}

impl From<f64> for Credits {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

impl From<Credits> for f64 {
    fn from(value: Credits) -> Self {
        value.as_f64()
    }
}

impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.minor_units < 0 { "-" } else { "" };
        let abs = self.minor_units.unsigned_abs();
        let per = MINOR_PER_CREDIT as u64;
        write!(f, "{}{}.{:02}", sign, abs / per, abs % per)
    }
}

// ============================================================================
// Weight & value
// ============================================================================

/// Bag weight and the overweight flag derived from it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightReport {
    pub total_kg: f64,
    pub overweight: bool,
}

/// Total weight of a container. Zero-quantity stacks contribute nothing.
pub fn container_weight(container: &Container) -> f64 {
    container
        .iter()
        .filter(|item| item.quantity > 0)
        .map(|item| item.total_weight())
        .sum()
}

/// Total credit value of a container
pub fn container_value(container: &Container) -> Credits {
    container
        .iter()
        .filter(|item| item.quantity > 0)
        .fold(Credits::ZERO, |acc, item| acc.saturating_add(item.total_value()))
}

/// Sum the bag and flag it when strictly heavier than `threshold_kg`.
pub fn recompute_weight(bag: &Container, threshold_kg: f64) -> WeightReport {
    let total_kg = container_weight(bag);
    WeightReport {
        total_kg,
        overweight: total_kg > threshold_kg,
    }
}

// ============================================================================
// Balance changes
// ============================================================================

/// Debit `cost`, or report how much is missing.
pub fn apply_purchase(credits: Credits, cost: Credits) -> Result<Credits, ActionError> {
    if cost > credits {
        return Err(ActionError::InsufficientFunds {
            missing: cost.saturating_sub(credits),
        });
    }
    Ok(credits.saturating_sub(cost))
}

pub fn apply_sale(credits: Credits, proceeds: Credits) -> Credits {
    credits.saturating_add(proceeds)
}

/// Direct balance overwrite. Same coercion as item amounts: invalid → 0, negative → 0.
pub fn apply_credit_edit(raw: &Value) -> Credits {
    Credits::from_f64(coerce_amount(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{Item, ItemId};
    use serde_json::json;

    fn stack(id: &str, price: f64, weight: f64, qty: u32) -> Item {
        Item::new(ItemId::new(id), id, Credits::from_f64(price), weight, qty)
    }

    #[test]
    fn test_credits_display() {
        assert_eq!(Credits::from_f64(12.346).to_string(), "12.35");
        assert_eq!(Credits::whole(500).to_string(), "500.00");
        assert_eq!(Credits::from_minor(-250).to_string(), "-2.50");
        assert_eq!(Credits::from_minor(-5).to_string(), "-0.05");
    }

    #[test]
    fn test_credits_serialize_as_number() {
        let json = serde_json::to_string(&Credits::from_f64(16.5)).unwrap();
        assert_eq!(json, "16.5");
        let back: Credits = serde_json::from_str("2").unwrap();
        assert_eq!(back, Credits::whole(2));
    }

    #[test]
    fn test_weight_report_threshold_is_strict() {
        let bag = Container::new(vec![stack("anvil", 1.0, 25.0, 2)]);
        let report = recompute_weight(&bag, 50.0);
        assert!((report.total_kg - 50.0).abs() < 1e-9);
        assert!(!report.overweight);

        let bag = Container::new(vec![stack("anvil", 1.0, 25.0, 2), stack("pebble", 0.0, 0.5, 1)]);
        assert!(recompute_weight(&bag, 50.0).overweight);
    }

    #[test]
    fn test_zero_quantity_stacks_are_ignored() {
        let bag = Container::new(vec![stack("ghost", 99.0, 99.0, 0), stack("coin", 1.0, 0.1, 3)]);
        assert_eq!(container_value(&bag), Credits::whole(3));
        assert!((container_weight(&bag) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_apply_purchase_reports_missing_amount() {
        let result = apply_purchase(Credits::whole(20), Credits::whole(30));
        assert_eq!(
            result,
            Err(ActionError::InsufficientFunds {
                missing: Credits::whole(10)
            })
        );
        assert_eq!(apply_purchase(Credits::whole(20), Credits::whole(20)), Ok(Credits::ZERO));
    }

    #[test]
    fn test_apply_sale_and_edit() {
        assert_eq!(apply_sale(Credits::whole(10), Credits::whole(6)), Credits::whole(16));
        assert_eq!(apply_credit_edit(&json!("42,5")), Credits::from_f64(42.5));
        assert_eq!(apply_credit_edit(&json!("abc")), Credits::ZERO);
        assert_eq!(apply_credit_edit(&json!(-3)), Credits::ZERO);
    }
}
