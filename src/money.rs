//! Money
//!
//! Monetary amounts in minor units (cents), with exact decimal percentage
//! arithmetic for tax and discount calculations.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use thiserror::Error;

/// Errors that can occur during monetary arithmetic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    /// An addition or multiplication overflowed the minor-unit range.
    #[error("monetary arithmetic overflowed")]
    Overflow,

    /// A percentage calculation could not be safely represented in minor units.
    #[error("percentage conversion overflowed or was not representable")]
    PercentConversion,

    /// A decimal amount could not be parsed or converted to minor units.
    #[error("invalid monetary amount: {0}")]
    InvalidAmount(String),
}

/// A monetary amount in minor units (pence/cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Money(i64);

impl Money {
    /// Zero amount.
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from minor units.
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a new amount from whole major units (e.g. dollars).
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Returns the amount in minor units.
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// Parses a decimal string such as `"1200.00"` into an amount.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::InvalidAmount`] if the string is not a decimal
    /// number or has no exact minor-unit representation.
    pub fn parse(s: &str) -> Result<Self, MoneyError> {
        Decimal::from_str(s.trim())
            .ok()
            .and_then(Self::from_decimal)
            .ok_or_else(|| MoneyError::InvalidAmount(s.to_owned()))
    }

    /// Converts a decimal major-unit amount into minor units, rounding to the
    /// nearest cent away from zero on midpoints.
    pub fn from_decimal(major: Decimal) -> Option<Self> {
        let minor = major
            .checked_mul(Decimal::ONE_HUNDRED)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()?;

        Some(Money(minor))
    }

    /// Adds another amount.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Overflow`] if the sum exceeds the minor-unit range.
    pub fn add(self, other: Money) -> Result<Money, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or(MoneyError::Overflow)
    }

    /// Multiplies by a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Overflow`] if the product exceeds the minor-unit range.
    pub fn times(self, quantity: u32) -> Result<Money, MoneyError> {
        self.0
            .checked_mul(i64::from(quantity))
            .map(Money)
            .ok_or(MoneyError::Overflow)
    }

    /// Subtracts another amount, clamping the result at zero.
    #[must_use]
    pub fn sub_or_zero(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0).max(0))
    }

    /// Calculates `rate`% of this amount, rounded midpoint-away-from-zero
    /// to the nearest minor unit.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::PercentConversion`] if the intermediate decimal
    /// calculation overflows or the result does not fit in minor units.
    pub fn percent(self, rate: Decimal) -> Result<Money, MoneyError> {
        let Some(minor) = Decimal::from_i64(self.0) else {
            return Err(MoneyError::PercentConversion);
        };

        let Some(applied) = minor.checked_mul(rate) else {
            return Err(MoneyError::PercentConversion);
        };

        let Some(scaled) = applied.checked_div(Decimal::ONE_HUNDRED) else {
            return Err(MoneyError::PercentConversion);
        };

        let rounded = scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let Some(rounded) = rounded.to_i64() else {
            return Err(MoneyError::PercentConversion);
        };

        Ok(Money(rounded))
    }

    /// Returns true if the amount is negative.
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let minor = self.0.unsigned_abs();

        write!(f, "{sign}${}.{:02}", minor / 100, minor % 100)
    }
}

/// Sums an iterator of amounts with overflow checking.
///
/// # Errors
///
/// Returns [`MoneyError::Overflow`] if any partial sum overflows.
pub fn total<I>(amounts: I) -> Result<Money, MoneyError>
where
    I: IntoIterator<Item = Money>,
{
    amounts
        .into_iter()
        .try_fold(Money::ZERO, |acc, amount| acc.add(amount))
}
