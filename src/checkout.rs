//! Checkout
//!
//! The checkout session orchestrator: subtotal, promotion, payment dispatch,
//! invoicing, and cart reset, in that order. Coupon and invoicing problems
//! are downgraded to warnings; the session always returns to a clean,
//! checkout-ready state.

use thiserror::Error;

use crate::{
    cart::{Cart, CartError},
    catalog::Catalog,
    invoice::{Invoice, InvoiceSink},
    money::{Money, MoneyError},
    payment::{PaymentGateway, PaymentMethod},
    pricing::{self, PriceBreakdown, PricingError},
    promotions::coupon_adjustment,
};

/// Errors raised while adding items through the session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The product id is not in the catalog.
    #[error("product id not found: {0}")]
    UnknownProduct(String),

    /// The cart rejected the line.
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Hard checkout failures.
///
/// These abort before any side effect; recoverable conditions (bad coupon,
/// invoice write failure) are reported as [`CheckoutWarning`]s instead.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Pricing the cart failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Monetary arithmetic failed outside the pricing pipeline.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Recoverable conditions surfaced by a completed checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutWarning {
    /// The supplied coupon code was not recognized; no adjustment applied.
    InvalidCoupon {
        /// The rejected code.
        code: String,
    },

    /// The invoice could not be persisted; payment was not rolled back.
    InvoiceWrite {
        /// Description of the write failure.
        reason: String,
    },
}

/// A finalized checkout: totals, promotion trail, and any warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedOrder {
    /// Gross, tax, and tax-inclusive base for the order.
    pub breakdown: PriceBreakdown,

    /// The promotion trail, e.g. `Subtotal + Applied 10% Discount`.
    pub promotion: String,

    /// Final payable amount.
    pub total: Money,

    /// Payment method the charge was dispatched to.
    pub method: PaymentMethod,

    /// Order id recorded on the invoice.
    pub order_id: String,

    /// Recoverable conditions encountered along the way.
    pub warnings: Vec<CheckoutWarning>,
}

/// Outcome of a checkout attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// The cart was empty; nothing was charged, invoiced, or cleared.
    EmptyCart,

    /// The order was priced, charged, invoiced, and the cart reset.
    Completed(CompletedOrder),
}

/// A single checkout session: one cart, one catalog, one gateway, one
/// invoice sink.
///
/// Not safe for concurrent mutation; concurrent hosts need one session per
/// cart.
#[derive(Debug)]
pub struct Session<'a, G, S> {
    catalog: &'a Catalog,
    cart: Cart,
    gateway: G,
    sink: S,
}

impl<'a, G, S> Session<'a, G, S>
where
    G: PaymentGateway,
    S: InvoiceSink,
{
    /// Creates a session with an empty cart.
    pub fn new(catalog: &'a Catalog, gateway: G, sink: S) -> Self {
        Session {
            catalog,
            cart: Cart::new(),
            gateway,
            sink,
        }
    }

    /// Creates a session with an empty cart and a custom stock ceiling.
    pub fn with_stock_ceiling(catalog: &'a Catalog, gateway: G, sink: S, ceiling: u32) -> Self {
        Session {
            catalog,
            cart: Cart::with_stock_ceiling(ceiling),
            gateway,
            sink,
        }
    }

    /// The session's cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The payment gateway charges are dispatched to.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// The sink invoices are persisted to.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Looks a product up in the catalog and adds it to the cart.
    ///
    /// # Errors
    ///
    /// - [`SessionError::UnknownProduct`]: the id is not in the catalog.
    /// - [`SessionError::Cart`]: the quantity was rejected; the cart is
    ///   unchanged.
    pub fn add_item(&mut self, product_id: &str, quantity: i64) -> Result<(), SessionError> {
        let product = self
            .catalog
            .lookup(product_id)
            .ok_or_else(|| SessionError::UnknownProduct(product_id.to_owned()))?;

        self.cart.add_line(product, quantity)?;

        Ok(())
    }

    /// Runs the full checkout sequence: price, promote, charge, invoice,
    /// reset.
    ///
    /// An empty cart is a no-op. An unrecognized coupon or a failed invoice
    /// write is reported in the outcome's warnings; neither aborts the
    /// checkout. After any completed checkout the cart is empty.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] only for arithmetic failures, which occur
    /// before any payment or invoicing side effect.
    pub fn checkout(&mut self, coupon: &str, method: &str) -> Result<CheckoutOutcome, CheckoutError> {
        if self.cart.is_empty() {
            return Ok(CheckoutOutcome::EmptyCart);
        }

        let mut warnings = Vec::new();

        // Price, then resolve the promotion. The adjustment chain holds at
        // most one rule for the current coupon set.
        let breakdown = pricing::breakdown(&self.cart)?;

        let adjustments = match coupon_adjustment(coupon) {
            Ok(Some(adjustment)) => vec![adjustment],
            Ok(None) => Vec::new(),
            Err(invalid) => {
                tracing::warn!(code = %invalid.0, "ignoring unrecognized coupon");
                warnings.push(CheckoutWarning::InvalidCoupon { code: invalid.0 });
                Vec::new()
            }
        };

        let quote = pricing::quote(&breakdown, &adjustments)?;
        let total = quote.amount();

        // Snapshot the invoice before any side effect goes out.
        let invoice = Invoice::from_cart(&self.cart, breakdown.tax(), total)?;
        let order_id = invoice.order_id().to_owned();

        let method = PaymentMethod::resolve(method);
        self.gateway.charge(method, total);
        tracing::info!(%order_id, amount = %total, %method, "payment dispatched");

        // No transactional guarantee across payment and invoicing: a failed
        // write is reported, never rolled back.
        if let Err(err) = self.sink.persist(&invoice) {
            tracing::warn!(%order_id, error = %err, "invoice persistence failed");
            warnings.push(CheckoutWarning::InvoiceWrite {
                reason: err.to_string(),
            });
        }

        self.cart.clear();

        Ok(CheckoutOutcome::Completed(CompletedOrder {
            breakdown,
            promotion: quote.description().to_owned(),
            total,
            method,
            order_id,
            warnings,
        }))
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        invoice::{InvoiceError, MemorySink},
        money::Money,
    };

    use super::*;

    /// Gateway that records every charge it is asked to make.
    #[derive(Debug, Default)]
    struct RecordingGateway {
        charges: Vec<(PaymentMethod, Money)>,
    }

    impl PaymentGateway for RecordingGateway {
        fn charge(&mut self, method: PaymentMethod, amount: Money) {
            self.charges.push((method, amount));
        }
    }

    /// Sink that fails every persist call.
    #[derive(Debug, Default)]
    struct BrokenSink;

    impl InvoiceSink for BrokenSink {
        fn persist(&mut self, _invoice: &Invoice) -> Result<(), InvoiceError> {
            Err(InvoiceError::Io(std::io::Error::other("disk full")))
        }
    }

    #[test]
    fn empty_cart_checkout_is_a_no_op() -> TestResult {
        let catalog = Catalog::sample()?;
        let mut session = Session::new(&catalog, RecordingGateway::default(), MemorySink::new());

        let outcome = session.checkout("SAVE10", "CARD")?;

        assert_eq!(outcome, CheckoutOutcome::EmptyCart);
        assert!(session.gateway.charges.is_empty());
        assert!(session.sink.invoices().is_empty());
        assert!(session.cart().is_empty());

        Ok(())
    }

    #[test]
    fn add_item_rejects_unknown_ids() -> TestResult {
        let catalog = Catalog::sample()?;
        let mut session = Session::new(&catalog, RecordingGateway::default(), MemorySink::new());

        assert_eq!(
            session.add_item("P999", 1),
            Err(SessionError::UnknownProduct("P999".to_owned()))
        );
        assert!(session.cart().is_empty());

        Ok(())
    }

    #[test]
    fn add_item_propagates_cart_rejections() -> TestResult {
        let catalog = Catalog::sample()?;
        let mut session = Session::new(&catalog, RecordingGateway::default(), MemorySink::new());

        assert_eq!(
            session.add_item("P101", 0),
            Err(SessionError::Cart(CartError::InvalidQuantity(0)))
        );

        Ok(())
    }

    #[test]
    fn checkout_charges_invoices_and_resets() -> TestResult {
        let catalog = Catalog::sample()?;
        let mut session = Session::new(&catalog, RecordingGateway::default(), MemorySink::new());

        session.add_item("P101", 1)?;

        let outcome = session.checkout("SAVE10", "CARD")?;

        let order = match outcome {
            CheckoutOutcome::Completed(order) => order,
            CheckoutOutcome::EmptyCart => panic!("expected a completed order"),
        };

        assert_eq!(order.breakdown.gross(), Money::from_minor(120_000));
        assert_eq!(order.breakdown.tax(), Money::from_minor(21_600));
        assert_eq!(order.total, Money::from_minor(127_440));
        assert_eq!(order.promotion, "Subtotal + Applied 10% Discount");
        assert!(order.warnings.is_empty());

        assert_eq!(
            session.gateway.charges,
            [(PaymentMethod::Card, Money::from_minor(127_440))]
        );
        match session.sink.invoices() {
            [invoice] => assert_eq!(invoice.total(), Money::from_minor(127_440)),
            other => panic!("expected a single persisted invoice, got {other:?}"),
        }
        assert!(session.cart().is_empty());

        Ok(())
    }

    #[test]
    fn invalid_coupon_warns_and_charges_the_base() -> TestResult {
        let catalog = Catalog::sample()?;
        let mut session = Session::new(&catalog, RecordingGateway::default(), MemorySink::new());

        session.add_item("P101", 1)?;

        let outcome = session.checkout("SAVE99", "CARD")?;

        let order = match outcome {
            CheckoutOutcome::Completed(order) => order,
            CheckoutOutcome::EmptyCart => panic!("expected a completed order"),
        };

        assert_eq!(order.total, Money::from_minor(141_600));
        assert_eq!(order.promotion, "Subtotal");
        assert_eq!(
            order.warnings,
            [CheckoutWarning::InvalidCoupon {
                code: "SAVE99".to_owned(),
            }]
        );

        Ok(())
    }

    #[test]
    fn unknown_payment_method_falls_back_to_card() -> TestResult {
        let catalog = Catalog::sample()?;
        let mut session = Session::new(&catalog, RecordingGateway::default(), MemorySink::new());

        session.add_item("P104", 1)?;
        session.checkout("", "bank-transfer")?;

        match session.gateway.charges.as_slice() {
            [(method, _)] => assert_eq!(*method, PaymentMethod::Card),
            other => panic!("expected a single charge, got {other:?}"),
        }

        Ok(())
    }

    #[test]
    fn invoice_failure_warns_but_completes_and_resets() -> TestResult {
        let catalog = Catalog::sample()?;
        let mut session = Session::new(&catalog, RecordingGateway::default(), BrokenSink);

        session.add_item("P102", 1)?;

        let outcome = session.checkout("", "UPI")?;

        let order = match outcome {
            CheckoutOutcome::Completed(order) => order,
            CheckoutOutcome::EmptyCart => panic!("expected a completed order"),
        };

        assert!(
            matches!(
                order.warnings.as_slice(),
                [CheckoutWarning::InvoiceWrite { .. }]
            ),
            "expected a single invoice-write warning, got {:?}",
            order.warnings
        );

        // Payment still went out and the cart is still reset.
        assert_eq!(session.gateway.charges.len(), 1);
        assert!(session.cart().is_empty());

        // A fresh add succeeds on the clean cart.
        session.add_item("P103", 2)?;
        assert_eq!(session.cart().len(), 1);

        Ok(())
    }

    #[test]
    fn custom_stock_ceiling_applies_to_session_adds() -> TestResult {
        let catalog = Catalog::sample()?;
        let mut session = Session::with_stock_ceiling(
            &catalog,
            RecordingGateway::default(),
            MemorySink::new(),
            2,
        );

        assert_eq!(
            session.add_item("P104", 3),
            Err(SessionError::Cart(CartError::OutOfStock {
                requested: 3,
                ceiling: 2,
            }))
        );

        Ok(())
    }
}
