//! Fixed-point money at cent precision.
//!
//! Every value is rounded half-up (midpoint away from zero) to two decimal
//! places after each operation, so long runs of small entries never drift.

use crate::ledger::LedgerError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

/// Currency suffix used for display
pub const CURRENCY: &str = "CHF";

/// Number of decimal places every amount is kept at
pub const SCALE: u32 = 2;

/// Round to cents, half-up.
pub fn quantize(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(SCALE);
    // no "-0.00"
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}

/// A quantized amount of money
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::from_parts(0, 0, 0, false, SCALE));

    /// Largest storable amount, `9999999999999999.99` (`NUMERIC(18,2)`)
    pub const MAX_AMOUNT: Money = Money(Decimal::from_parts(2_808_348_671, 232_830_643, 0, false, SCALE));

    /// Wrap a decimal, rounding it to cents
    pub fn new(value: Decimal) -> Self {
        Self(quantize(value))
    }

    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, SCALE))
    }

    /// Parse an amount typed by a person.
    ///
    /// Surrounding whitespace is ignored and a comma is accepted as decimal
    /// separator (`"3,50"`). The sign is not checked here.
    ///
    /// # Errors
    ///
    /// * `LedgerError::InvalidAmount` - Empty, not a decimal number or beyond [`Money::MAX_AMOUNT`]
    pub fn parse_input(input: &str) -> Result<Self, LedgerError> {
        let normalized = input.trim().replace(',', ".");
        if normalized.is_empty() {
            return Err(LedgerError::InvalidAmount(input.to_string()));
        }
        normalized
            .parse::<Money>()
            .ok()
            .filter(Money::is_within_limits)
            .ok_or_else(|| LedgerError::InvalidAmount(input.to_string()))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Absolute value at most [`Money::MAX_AMOUNT`]
    pub fn is_within_limits(&self) -> bool {
        self.0.abs() <= Self::MAX_AMOUNT.0
    }

    /// Sum, or `None` if the decimal overflows
    pub fn checked_add(self, rhs: Money) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self::new)
    }

    /// Difference, or `None` if the decimal overflows
    pub fn checked_sub(self, rhs: Money) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self::new)
    }

    /// Multiply by a whole count (e.g. one stake per loser), `None` on overflow
    pub fn checked_times(self, count: u32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(count)).map(Self::new)
    }

    /// Share of this amount when split evenly between `parts`, rounded to cents.
    ///
    /// Returns zero for zero parts.
    pub fn split(self, parts: u32) -> Self {
        if parts == 0 {
            return Self::ZERO;
        }
        Self::new(self.0 / Decimal::from(parts))
    }

    /// Display with currency suffix, e.g. `"5.00 CHF"`
    pub fn chf(&self) -> String {
        format!("{self} {CURRENCY}")
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Self::new)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

impl From<Money> for String {
    fn from(value: Money) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Money {
    type Error = rust_decimal::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money::new(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money::new(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money::new(-self.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        *self = *self - rhs;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}
