//! Bitcoin amounts using decimal arithmetic.
//!
//! Menu prices are fractions of a bitcoin (`0.0038`). The service sends and
//! expects plain JSON numbers, so the wire form is a float while the
//! in-memory form is an exact [`Decimal`] that sums without drift.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount of bitcoin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bitcoin(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Bitcoin {
    /// Display suffix used throughout the storefront.
    pub const SYMBOL: &'static str = "₿";

    /// Zero bitcoin.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount from a decimal.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create an amount from a mantissa and scale, e.g. `(38, 4)` is `0.0038`.
    #[must_use]
    pub fn from_parts(mantissa: i64, scale: u32) -> Self {
        Self(Decimal::new(mantissa, scale))
    }

    /// The underlying decimal.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Add for Bitcoin {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Bitcoin {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Bitcoin {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl From<Decimal> for Bitcoin {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Bitcoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0.normalize(), Self::SYMBOL)
    }
}
