//! Cart
//!
//! An ordered collection of product selections with derived subtotal and tax
//! queries.

use thiserror::Error;

use crate::{
    catalog::Product,
    money::{Money, MoneyError},
};

/// Default per-request quantity ceiling, standing in for real stock tracking.
pub const DEFAULT_STOCK_CEILING: u32 = 10;

/// Errors raised when adding a line to the cart.
///
/// Both variants are rejected before the cart is mutated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// A non-positive quantity was requested.
    #[error("invalid quantity {0}; must be positive")]
    InvalidQuantity(i64),

    /// The requested quantity exceeds the stock ceiling.
    #[error("requested quantity {requested} exceeds stock limit of {ceiling}")]
    OutOfStock {
        /// Quantity that was requested.
        requested: i64,
        /// Configured per-request ceiling.
        ceiling: u32,
    },
}

/// One product selection: a product snapshot plus a positive quantity.
///
/// Lines are created by [`Cart::add_line`] and removed only by
/// [`Cart::clear`]; quantities never change once added.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    product: Product,
    quantity: u32,
}

impl CartLine {
    /// The product for this line.
    pub fn product(&self) -> &Product {
        &self.product
    }

    /// Quantity selected, always positive.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Line subtotal: quantity times unit price.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the multiplication overflows.
    pub fn subtotal(&self) -> Result<Money, MoneyError> {
        self.product.unit_price().times(self.quantity)
    }

    /// Line tax: the product's tax rate applied to the line subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the arithmetic overflows.
    pub fn tax(&self) -> Result<Money, MoneyError> {
        self.subtotal()?.percent(self.product.tax_rate())
    }
}

/// An ordered sequence of cart lines, insertion order preserved.
#[derive(Debug)]
pub struct Cart {
    lines: Vec<CartLine>,
    stock_ceiling: u32,
}

impl Cart {
    /// Creates an empty cart with the default stock ceiling.
    pub fn new() -> Self {
        Cart::with_stock_ceiling(DEFAULT_STOCK_CEILING)
    }

    /// Creates an empty cart with a custom per-request quantity ceiling.
    pub fn with_stock_ceiling(stock_ceiling: u32) -> Self {
        Cart {
            lines: Vec::new(),
            stock_ceiling,
        }
    }

    /// Appends a new line for the given product.
    ///
    /// Repeated adds of the same product create separate lines rather than
    /// merging quantities.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`]: `quantity` is zero or negative.
    /// - [`CartError::OutOfStock`]: `quantity` exceeds the stock ceiling.
    pub fn add_line(&mut self, product: &Product, quantity: i64) -> Result<(), CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        if quantity > i64::from(self.stock_ceiling) {
            return Err(CartError::OutOfStock {
                requested: quantity,
                ceiling: self.stock_ceiling,
            });
        }

        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "quantity is positive and at most the u32 stock ceiling"
        )]
        let quantity = quantity as u32;

        self.lines.push(CartLine {
            product: product.clone(),
            quantity,
        });

        Ok(())
    }

    /// The lines in insertion order.
    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    /// Number of lines in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Empties the cart. Idempotent.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of line subtotals.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if any line subtotal or the sum overflows.
    pub fn subtotal(&self) -> Result<Money, MoneyError> {
        self.lines
            .iter()
            .try_fold(Money::ZERO, |acc, line| acc.add(line.subtotal()?))
    }

    /// Sum of line tax amounts.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if any line tax or the sum overflows.
    pub fn tax_total(&self) -> Result<Money, MoneyError> {
        self.lines
            .iter()
            .try_fold(Money::ZERO, |acc, line| acc.add(line.tax()?))
    }
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}
