//! Fixed-point money.
//!
//! Amounts are stored as integer minor units (cents). Intermediate values such
//! as `subtotal × (1 + taxRate)` are computed as exact `Decimal`s and rounded
//! to cents once, with the same half-up behaviour as `Math.round(x * 100) / 100`
//! (halves go toward positive infinity). Nothing in here touches `f64`, and
//! every operation that can leave the `i64` range is checked.

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Decimal places of a currency amount
pub const MONEY_SCALE: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountParseError {
    #[error("amount is empty")]
    Empty,
    #[error("'{0}' is not a decimal number")]
    Invalid(String),
    #[error("'{0}' has more than two decimal places")]
    TooPrecise(String),
    #[error("'{0}' is out of range")]
    OutOfRange(String),
}

/// Parses a plain decimal string such as `"0.13"` or `"-2.675"`.
pub fn parse_decimal(input: &str) -> Result<Decimal, AmountParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AmountParseError::Empty);
    }
    Decimal::from_str(trimmed).map_err(|_| AmountParseError::Invalid(trimmed.to_string()))
}

/// Parses a percentage (`"13"` means 13 %) into a rate (`0.13`).
pub fn parse_percentage(input: &str) -> Result<Decimal, AmountParseError> {
    parse_decimal(input)?
        .checked_div(Decimal::ONE_HUNDRED)
        .ok_or_else(|| AmountParseError::OutOfRange(input.trim().to_string()))
}

/// `1 + rate`, the gross-up factor for a tax rate
pub fn tax_factor(rate: Decimal) -> Option<Decimal> {
    Decimal::ONE.checked_add(rate)
}

/// A currency amount in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Rounds a value in major units to cents, halves toward +∞.
    /// `None` when the result does not fit.
    pub fn round(value: Decimal) -> Option<Money> {
        let strategy = if value.is_sign_negative() {
            RoundingStrategy::MidpointTowardZero
        } else {
            RoundingStrategy::MidpointAwayFromZero
        };
        value
            .round_dp_with_strategy(MONEY_SCALE, strategy)
            .checked_mul(Decimal::ONE_HUNDRED)?
            .to_i64()
            .map(Money)
    }

    /// Parses a decimal string of any precision and rounds it to cents.
    pub fn round_str(input: &str) -> Result<Money, AmountParseError> {
        Money::round(parse_decimal(input)?).ok_or_else(|| AmountParseError::OutOfRange(input.trim().to_string()))
    }

    /// The exact value in major units.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, MONEY_SCALE)
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// `round(self × factor)`
    pub fn multiply_by_rate(&self, factor: Decimal) -> Option<Money> {
        Money::round(self.to_decimal().checked_mul(factor)?)
    }

    /// `round(self / factor)`, `None` when `factor` is zero.
    pub fn divide_by_rate(&self, factor: Decimal) -> Option<Money> {
        Money::round(self.to_decimal().checked_div(factor)?)
    }

    /// Exact multiplication by a count
    pub fn multiply_by_int(&self, count: u32) -> Option<Money> {
        self.0.checked_mul(i64::from(count)).map(Money)
    }

    /// `round(self / count)`, `None` when `count` is zero.
    pub fn divide_by_int(&self, count: u32) -> Option<Money> {
        Money::round(self.to_decimal().checked_div(Decimal::from(count))?)
    }
}

impl FromStr for Money {
    type Err = AmountParseError;

    /// Strict boundary parser: accepts at most two decimal places.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let value = parse_decimal(input)?;
        if value.normalize().scale() > MONEY_SCALE {
            return Err(AmountParseError::TooPrecise(input.trim().to_string()));
        }
        Money::round(value).ok_or_else(|| AmountParseError::OutOfRange(input.trim().to_string()))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

// Ledger arithmetic. Every operand is bounded by an invoice total, so these
// use plain `i64` arithmetic; derivations go through the checked methods.
impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 -= other.0;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}
