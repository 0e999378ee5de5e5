//! Pricing
//!
//! Turns a cart into a tax-inclusive base amount, then threads it through
//! the optional promotional adjustment chain.

use thiserror::Error;

use crate::{
    cart::Cart,
    money::{Money, MoneyError},
    promotions::{Adjustment, AdjustedTotal},
};

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// Wrapped monetary arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Per-checkout totals before any promotion: gross subtotal, tax, and the
/// tax-inclusive base. Recomputed on every checkout, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBreakdown {
    gross: Money,
    tax: Money,
    with_tax: Money,
}

impl PriceBreakdown {
    /// Sum of line subtotals.
    pub fn gross(&self) -> Money {
        self.gross
    }

    /// Sum of line tax amounts.
    pub fn tax(&self) -> Money {
        self.tax
    }

    /// Gross plus tax: the base for promotional adjustments.
    pub fn with_tax(&self) -> Money {
        self.with_tax
    }
}

/// Computes the breakdown for a cart: gross, tax, and gross + tax, in that
/// fixed order.
///
/// # Errors
///
/// Returns a [`PricingError`] if any of the sums overflow.
pub fn breakdown(cart: &Cart) -> Result<PriceBreakdown, PricingError> {
    let gross = cart.subtotal()?;
    let tax = cart.tax_total()?;
    let with_tax = gross.add(tax)?;

    Ok(PriceBreakdown {
        gross,
        tax,
        with_tax,
    })
}

/// Builds the final quote from a breakdown and the adjustments to apply,
/// left to right.
///
/// # Errors
///
/// Returns a [`PricingError`] if an adjustment's arithmetic overflows.
pub fn quote(
    breakdown: &PriceBreakdown,
    adjustments: &[Adjustment],
) -> Result<AdjustedTotal, PricingError> {
    adjustments
        .iter()
        .try_fold(AdjustedTotal::base(breakdown.with_tax()), |total, rule| {
            total.apply(rule)
        })
        .map_err(PricingError::from)
}
