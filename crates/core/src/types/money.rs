//! Rupee amounts with decimal arithmetic.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount in Indian rupees.
///
/// The library backend reports fines and payment amounts as plain JSON
/// numbers; `Money` keeps them in exact decimal arithmetic instead of
/// binary floats and renders the `₹` display form used across the portal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount from a decimal rupee value.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Get the underlying decimal value.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{:.2}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_two_decimal_places() {
        assert_eq!(Money::new(Decimal::new(5, 0)).to_string(), "₹5.00");
        assert_eq!(Money::new(Decimal::new(1250, 2)).to_string(), "₹12.50");
        assert_eq!(Money::ZERO.to_string(), "₹0.00");
    }

    #[test]
    fn test_deserialize_json_number() {
        let money: Money = serde_json::from_str("4.5").unwrap();
        assert_eq!(money, Money::new(Decimal::new(45, 1)));
    }

    #[test]
    fn test_deserialize_json_string() {
        let money: Money = serde_json::from_str("\"4.50\"").unwrap();
        assert_eq!(money, Money::new(Decimal::new(450, 2)));
    }

    #[test]
    fn test_sum() {
        let total: Money = [
            Money::new(Decimal::new(5, 0)),
            Money::new(Decimal::new(1050, 2)),
        ]
        .into_iter()
        .sum();
        assert_eq!(total, Money::new(Decimal::new(1550, 2)));
    }

    #[test]
    fn test_sum_empty_is_zero() {
        let total: Money = core::iter::empty().sum();
        assert_eq!(total, Money::ZERO);
    }
}
