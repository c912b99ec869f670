//! Products

use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;

use crate::tiers::{PriceTiers, TierError};

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Product with its authoritative base price and volume tiers.
#[derive(Debug, Clone)]
pub struct Product<'a> {
    /// Product name
    pub name: String,

    /// Stock keeping unit
    pub sku: String,

    price: Money<'a, Currency>,
    tiers: PriceTiers<'a>,
}

impl<'a> Product<'a> {
    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns [`TierError::CurrencyMismatch`] if any tier is priced in a different currency
    /// from the base price.
    pub fn new(
        name: impl Into<String>,
        sku: impl Into<String>,
        price: Money<'a, Currency>,
        tiers: PriceTiers<'a>,
    ) -> Result<Self, TierError> {
        tiers.ensure_currency(price.currency())?;

        Ok(Self {
            name: name.into(),
            sku: sku.into(),
            price,
            tiers,
        })
    }

    /// Create a product with no volume tiers.
    pub fn untiered(
        name: impl Into<String>,
        sku: impl Into<String>,
        price: Money<'a, Currency>,
    ) -> Self {
        Self {
            name: name.into(),
            sku: sku.into(),
            price,
            tiers: PriceTiers::none(),
        }
    }

    /// Base unit price.
    pub fn price(&self) -> &Money<'a, Currency> {
        &self.price
    }

    /// Volume tiers.
    pub fn tiers(&self) -> &PriceTiers<'a> {
        &self.tiers
    }
}
