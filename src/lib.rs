//! Storefront
//!
//! Storefront is a small pricing and checkout engine: carts of catalog
//! products are priced with category-based tax, threaded through an optional
//! promotional adjustment, charged through a payment gateway, and recorded
//! as invoices.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod invoice;
pub mod money;
pub mod payment;
pub mod prelude;
pub mod pricing;
pub mod promotions;
