//! Payment
//!
//! Payment-method resolution and the dispatch boundary. Method names map
//! directly to a small closed set of variants; unknown names fall back to
//! card, which is the lenient policy the storefront wants at checkout.

use std::fmt;

use crate::money::Money;

/// The supported payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Credit or debit card.
    Card,

    /// Unified Payments Interface transfer.
    Upi,
}

impl PaymentMethod {
    /// Resolves a method name, case-insensitively.
    ///
    /// Anything other than `CARD` or `UPI` resolves to [`PaymentMethod::Card`].
    pub fn resolve(name: &str) -> Self {
        let name = name.trim();

        if name.eq_ignore_ascii_case("UPI") {
            PaymentMethod::Upi
        } else {
            PaymentMethod::Card
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Card => write!(f, "Credit Card"),
            PaymentMethod::Upi => write!(f, "UPI"),
        }
    }
}

/// The payment dispatch boundary.
///
/// Charges are fire-and-forget for this simulation: the gateway has no
/// failure mode the orchestrator consumes.
pub trait PaymentGateway {
    /// Charges the final payable amount via the resolved method.
    fn charge(&mut self, method: PaymentMethod, amount: Money);
}

/// Gateway that reports charges on standard output, like a terminal till.
#[derive(Debug, Default)]
pub struct ConsoleGateway;

impl PaymentGateway for ConsoleGateway {
    fn charge(&mut self, method: PaymentMethod, amount: Money) {
        match method {
            PaymentMethod::Card => println!("Processing Credit Card charge: {amount}"),
            PaymentMethod::Upi => println!("Processing UPI transaction: {amount}"),
        }
    }
}
