//! Shared models and DTOs for the Lonchera ordering platform
//!
//! This crate holds the serde data model used by `order-server` and its
//! clients (storefront, admin console):
//!
//! - `models`: persisted entities (menu, customer, order, payment ledger)
//! - `checkout`: request DTOs for the checkout flow
//! - `util`: time and ID helpers

pub mod checkout;
pub mod models;
pub mod util;
