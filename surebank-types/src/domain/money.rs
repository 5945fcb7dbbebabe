//! Non-negative monetary amount in minor units.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Type-safe amount of money.
///
/// Stored in the smallest unit of the currency (kobo) to avoid
/// floating-point precision issues. The ledger runs in a single currency,
/// so no currency tag is carried. Balances, which may go negative after a
/// reversal, are plain `i64` values and not `Money`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a new Money value.
    pub fn new(amount: i64) -> Result<Self, DomainError> {
        if amount < 0 {
            return Err(DomainError::NegativeAmount);
        }
        Ok(Self(amount))
    }

    /// Returns the amount in the smallest currency unit.
    pub fn amount(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_minor_units(self.0))
    }
}

/// Formats a signed minor-unit value as `major.minor`, e.g. `-12.05`.
pub fn format_minor_units(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let abs = value.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_creation() {
        let money = Money::new(1000).unwrap();
        assert_eq!(money.amount(), 1000);
    }

    #[test]
    fn test_negative_money_fails() {
        let result = Money::new(-100);
        assert!(matches!(result, Err(DomainError::NegativeAmount)));
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(1050).unwrap().to_string(), "10.50");
        assert_eq!(format_minor_units(-1205), "-12.05");
        assert_eq!(format_minor_units(7), "0.07");
    }
}
