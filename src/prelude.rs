//! Wholesale prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError},
    catalog::{Catalog, CatalogError},
    fixtures::{Fixture, FixtureError},
    items::LineItem,
    orders::{
        Order, OrderError, OrderLine, OrderLineRequest, OrderRequest, PriceDiscrepancy,
        place_order,
    },
    pricing::{
        LinePricing, MinimumOrderGate, NearUpgrade, PricingCalculator, PricingConfig,
        PricingError,
    },
    products::{Product, ProductKey},
    receipt::{CartSummary, ReceiptError},
    tiers::{PriceTier, PriceTiers, TierError},
};
