//! LUXE
//!
//! The storefront core of the LUXE nightclub: event catalog, cart, coupons,
//! checkout and per-member ticket issuance over a pluggable key-value store.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod context;
pub mod coupons;
pub mod discounts;
pub mod fixtures;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod receipt;
pub mod store;
pub mod tickets;
pub mod uuids;
pub mod validation;
