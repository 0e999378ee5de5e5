//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartLine, DEFAULT_STOCK_CEILING},
    catalog::{Catalog, CatalogError, Product, TaxSchedule},
    checkout::{
        CheckoutError, CheckoutOutcome, CheckoutWarning, CompletedOrder, Session, SessionError,
    },
    invoice::{FileSink, Invoice, InvoiceError, InvoiceLine, InvoiceSink, MemorySink},
    money::{Money, MoneyError},
    payment::{ConsoleGateway, PaymentGateway, PaymentMethod},
    pricing::{PriceBreakdown, PricingError},
    promotions::{Adjustment, AdjustedTotal, InvalidCoupon, PromotionError, coupon_adjustment},
};
