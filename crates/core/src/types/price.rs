//! Type-safe price representation using decimal arithmetic.
//!
//! The storefront sells in a single unit, the *synapse*. Prices travel over the
//! wire as JSON numbers and are held as [`Decimal`] so totals never pick up
//! floating point drift.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Display label for products without a price.
pub const PRICELESS_LABEL: &str = "Priceless";

/// Display suffix for amounts.
pub const CURRENCY_LABEL: &str = "synapses";

/// An amount of synapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// A zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of synapses.
    #[must_use]
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Format an optional price the way cards show it.
    ///
    /// `None` and zero both read as [`PRICELESS_LABEL`]; anything else is
    /// rendered with [`Price`]'s `Display`.
    #[must_use]
    pub fn label(price: Option<Self>) -> String {
        match price {
            Some(price) if !price.is_zero() => price.to_string(),
            _ => PRICELESS_LABEL.to_string(),
        }
    }

    /// The amount with thousands separated by spaces, without the unit.
    #[must_use]
    pub fn grouped(&self) -> String {
        let raw = self.0.normalize().to_string();
        let (sign, unsigned) = raw
            .strip_prefix('-')
            .map_or(("", raw.as_str()), |rest| ("-", rest));
        let (whole, fraction) = unsigned
            .split_once('.')
            .map_or((unsigned, None), |(w, f)| (w, Some(f)));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(' ');
            }
            grouped.push(digit);
        }

        match fraction {
            Some(fraction) => format!("{sign}{grouped}.{fraction}"),
            None => format!("{sign}{grouped}"),
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {CURRENCY_LABEL}", self.grouped())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}
