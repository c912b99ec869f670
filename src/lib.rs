//! Wholesale
//!
//! Tiered wholesale pricing for a B2B storefront: volume price tiers, cart totals and
//! savings, near-upgrade hints, the minimum order gate, and authoritative re-pricing at
//! order commit. The cart view and order commit share one [`pricing::PricingCalculator`].

pub mod cart;
pub mod catalog;
pub mod config;
pub mod fixtures;
pub mod items;
pub mod observability;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod tiers;
