//! Invoice
//!
//! The write-once invoice record produced by a successful checkout, and the
//! sinks that persist it.

use std::{fmt, fs, path::PathBuf};

use jiff::Timestamp;
use thiserror::Error;

use crate::{
    cart::Cart,
    money::{Money, MoneyError},
};

/// Invoice persistence errors.
///
/// Recovered locally during checkout: payment is not rolled back and the
/// cart is still reset.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// The invoice record could not be written.
    #[error("failed to write invoice: {0}")]
    Io(#[from] std::io::Error),
}

/// One invoiced line: the product name, quantity, and line subtotal at the
/// time of checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceLine {
    /// Product display name.
    pub name: String,

    /// Quantity purchased.
    pub quantity: u32,

    /// Line subtotal before tax.
    pub line_total: Money,
}

/// A write-once record of a completed checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    order_id: String,
    issued_at: Timestamp,
    lines: Vec<InvoiceLine>,
    tax: Money,
    total: Money,
}

impl Invoice {
    /// Snapshots the cart into a new invoice.
    ///
    /// The order id is derived from the issue time, which keeps it unique
    /// per checkout in this single-session flow.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if a line subtotal overflows.
    pub fn from_cart(cart: &Cart, tax: Money, total: Money) -> Result<Self, MoneyError> {
        let issued_at = Timestamp::now();
        let order_id = format!("ORD-{}", issued_at.as_millisecond());

        let lines = cart
            .lines()
            .map(|line| {
                Ok(InvoiceLine {
                    name: line.product().name().to_owned(),
                    quantity: line.quantity(),
                    line_total: line.subtotal()?,
                })
            })
            .collect::<Result<Vec<_>, MoneyError>>()?;

        Ok(Invoice {
            order_id,
            issued_at,
            lines,
            tax,
            total,
        })
    }

    /// Unique order identifier.
    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    /// Issue timestamp.
    pub fn issued_at(&self) -> Timestamp {
        self.issued_at
    }

    /// The invoiced lines.
    pub fn lines(&self) -> &[InvoiceLine] {
        &self.lines
    }

    /// Total tax across all lines.
    pub fn tax(&self) -> Money {
        self.tax
    }

    /// Final payable amount after promotions.
    pub fn total(&self) -> Money {
        self.total
    }

    /// Renders the invoice as the storefront's plain-text record.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Invoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "E-COMMERCE INVOICE")?;
        writeln!(f, "Order ID: {}", self.order_id)?;
        writeln!(f, "Date: {}", self.issued_at)?;
        writeln!(f, "------------------------------------------------")?;
        writeln!(f, "{:<20} {:<10} {:<10}", "Item", "Qty", "Total")?;

        for line in &self.lines {
            // Money ignores width flags, so pad the rendered string instead.
            let amount = line.line_total.to_string();
            writeln!(f, "{:<20} {:<10} {amount:<10}", line.name, line.quantity)?;
        }

        writeln!(f, "------------------------------------------------")?;
        writeln!(f, "Total Tax: {}", self.tax)?;
        writeln!(f, "Grand Total: {}", self.total)
    }
}

/// Where finalized invoices go.
pub trait InvoiceSink {
    /// Persists one invoice record.
    ///
    /// # Errors
    ///
    /// Returns an [`InvoiceError`] if the record could not be written.
    fn persist(&mut self, invoice: &Invoice) -> Result<(), InvoiceError>;
}

/// Writes each invoice as `invoice_<order id>.txt` in a directory.
#[derive(Debug)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    /// Creates a sink writing into the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileSink { dir: dir.into() }
    }

    /// Path the given invoice would be written to.
    pub fn path_for(&self, invoice: &Invoice) -> PathBuf {
        self.dir.join(format!("invoice_{}.txt", invoice.order_id()))
    }
}

impl InvoiceSink for FileSink {
    fn persist(&mut self, invoice: &Invoice) -> Result<(), InvoiceError> {
        fs::write(self.path_for(invoice), invoice.render())?;
        Ok(())
    }
}

/// Collects invoices in memory. Intended for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    invoices: Vec<Invoice>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        MemorySink::default()
    }

    /// The invoices persisted so far.
    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }
}

impl InvoiceSink for MemorySink {
    fn persist(&mut self, invoice: &Invoice) -> Result<(), InvoiceError> {
        self.invoices.push(invoice.clone());
        Ok(())
    }
}
