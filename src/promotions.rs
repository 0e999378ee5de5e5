//! Promotions
//!
//! Coupon resolution and the promotional adjustment chain. Adjustments are a
//! closed set of rule variants applied left-to-right over an accumulated
//! total; the current coupon set applies at most one, but chains of any
//! depth compose without changes to existing rules.

use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::money::{Money, MoneyError};

/// Errors raised when defining an adjustment rule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromotionError {
    /// A percentage outside the [0, 100] range was supplied.
    #[error("discount percentage {0} is outside the range 0-100")]
    PercentOutOfRange(Decimal),
}

/// An unrecognized, non-empty coupon code.
///
/// Recovered locally during checkout: the order proceeds unadjusted and the
/// error is surfaced as a warning.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("coupon code invalid: {0}")]
pub struct InvalidCoupon(pub String);

/// A single promotional adjustment rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Adjustment {
    /// Reduce the amount by a percentage of itself.
    PercentOff(Decimal),

    /// Subtract a flat amount, clamping the result at zero.
    FlatOff(Money),
}

impl Adjustment {
    /// Creates a percentage-off rule, validating the percentage up front.
    ///
    /// # Errors
    ///
    /// Returns [`PromotionError::PercentOutOfRange`] if `percent` is not
    /// within [0, 100].
    pub fn percent_off(percent: Decimal) -> Result<Self, PromotionError> {
        if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
            return Err(PromotionError::PercentOutOfRange(percent));
        }

        Ok(Adjustment::PercentOff(percent))
    }

    /// Creates a flat-amount-off rule.
    pub fn flat_off(amount: Money) -> Self {
        Adjustment::FlatOff(amount)
    }

    /// Applies this rule to an amount.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the percentage arithmetic overflows.
    pub fn apply(&self, amount: Money) -> Result<Money, MoneyError> {
        match self {
            Adjustment::PercentOff(percent) => {
                let discount = amount.percent(*percent)?;
                Ok(amount.sub_or_zero(discount))
            }
            Adjustment::FlatOff(flat) => Ok(amount.sub_or_zero(*flat)),
        }
    }
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Adjustment::PercentOff(percent) => write!(f, "Applied {percent}% Discount"),
            Adjustment::FlatOff(flat) => write!(f, "Applied Flat {flat} Off"),
        }
    }
}

/// A monetary amount together with the trail of adjustments that produced it.
///
/// Immutable once constructed; [`AdjustedTotal::apply`] returns a new value
/// with the rule's suffix appended to the description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustedTotal {
    amount: Money,
    description: String,
}

impl AdjustedTotal {
    /// Wraps an unadjusted base amount.
    pub fn base(amount: Money) -> Self {
        AdjustedTotal {
            amount,
            description: "Subtotal".to_owned(),
        }
    }

    /// Applies an adjustment, producing a new total with an extended trail.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the adjustment arithmetic overflows.
    pub fn apply(self, adjustment: &Adjustment) -> Result<Self, MoneyError> {
        let amount = adjustment.apply(self.amount)?;

        Ok(AdjustedTotal {
            amount,
            description: format!("{} + {adjustment}", self.description),
        })
    }

    /// The payable amount after all applied adjustments.
    pub fn amount(&self) -> Money {
        self.amount
    }

    /// Human-readable trail: the base description plus one suffix per
    /// applied rule, in application order.
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Resolves a coupon code to its adjustment rule.
///
/// Codes are matched case-insensitively. An empty (or all-whitespace) code
/// means no adjustment.
///
/// # Errors
///
/// Returns [`InvalidCoupon`] for any unrecognized non-empty code.
pub fn coupon_adjustment(code: &str) -> Result<Option<Adjustment>, InvalidCoupon> {
    let code = code.trim();

    if code.is_empty() {
        return Ok(None);
    }

    if code.eq_ignore_ascii_case("SAVE10") {
        return Ok(Some(Adjustment::PercentOff(Decimal::TEN)));
    }

    if code.eq_ignore_ascii_case("FLAT50") {
        return Ok(Some(Adjustment::flat_off(Money::from_major(50))));
    }

    Err(InvalidCoupon(code.to_owned()))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn percent_off_validates_range_at_definition_time() {
        assert!(Adjustment::percent_off(Decimal::ZERO).is_ok());
        assert!(Adjustment::percent_off(Decimal::ONE_HUNDRED).is_ok());

        assert_eq!(
            Adjustment::percent_off(Decimal::from(101)),
            Err(PromotionError::PercentOutOfRange(Decimal::from(101)))
        );
        assert_eq!(
            Adjustment::percent_off(Decimal::from(-5)),
            Err(PromotionError::PercentOutOfRange(Decimal::from(-5)))
        );
    }

    #[test]
    fn ten_percent_off_one_hundred_is_ninety() -> TestResult {
        let adjustment = Adjustment::percent_off(Decimal::TEN)?;

        assert_eq!(
            adjustment.apply(Money::from_major(100))?,
            Money::from_major(90)
        );

        Ok(())
    }

    #[test]
    fn flat_off_clamps_at_zero() -> TestResult {
        let adjustment = Adjustment::flat_off(Money::from_major(50));

        assert_eq!(adjustment.apply(Money::from_major(30))?, Money::ZERO);
        assert_eq!(
            adjustment.apply(Money::from_major(80))?,
            Money::from_major(30)
        );

        Ok(())
    }

    #[test]
    fn adjusted_total_appends_description_suffixes() -> TestResult {
        let total = AdjustedTotal::base(Money::from_major(100))
            .apply(&Adjustment::percent_off(Decimal::TEN)?)?;

        assert_eq!(total.amount(), Money::from_major(90));
        assert_eq!(total.description(), "Subtotal + Applied 10% Discount");

        Ok(())
    }

    #[test]
    fn adjustments_chain_in_application_order() -> TestResult {
        // No coupon stacking exists today, but the chain composes without
        // changes to the individual rules.
        let total = AdjustedTotal::base(Money::from_major(100))
            .apply(&Adjustment::percent_off(Decimal::TEN)?)?
            .apply(&Adjustment::flat_off(Money::from_major(50)))?;

        assert_eq!(total.amount(), Money::from_major(40));
        assert_eq!(
            total.description(),
            "Subtotal + Applied 10% Discount + Applied Flat $50.00 Off"
        );

        Ok(())
    }

    #[test]
    fn coupon_codes_are_case_insensitive() -> TestResult {
        assert_eq!(
            coupon_adjustment("save10")?,
            Some(Adjustment::PercentOff(Decimal::TEN))
        );
        assert_eq!(
            coupon_adjustment("Flat50")?,
            Some(Adjustment::FlatOff(Money::from_major(50)))
        );

        Ok(())
    }

    #[test]
    fn empty_coupon_means_no_adjustment() -> TestResult {
        assert_eq!(coupon_adjustment("")?, None);
        assert_eq!(coupon_adjustment("   ")?, None);

        Ok(())
    }

    #[test]
    fn unrecognized_coupon_is_rejected() {
        assert_eq!(
            coupon_adjustment("SAVE99"),
            Err(InvalidCoupon("SAVE99".to_owned()))
        );
    }
}
