//! Items

use rusty_money::{Money, iso::Currency};

use crate::{
    products::{Product, ProductKey},
    tiers::{PriceTiers, TierError},
};

/// A cart line: one product at some quantity, with the price data needed to total it.
#[derive(Clone, Debug, PartialEq)]
pub struct LineItem<'a> {
    product: ProductKey,
    unit_price: Money<'a, Currency>,
    quantity: u32,
    tiers: PriceTiers<'a>,
}

impl<'a> LineItem<'a> {
    /// Creates a new line item.
    ///
    /// # Errors
    ///
    /// Returns [`TierError::CurrencyMismatch`] if a tier is priced in another currency.
    pub fn new(
        product: ProductKey,
        unit_price: Money<'a, Currency>,
        quantity: u32,
        tiers: PriceTiers<'a>,
    ) -> Result<Self, TierError> {
        tiers.ensure_currency(unit_price.currency())?;

        Ok(Self {
            product,
            unit_price,
            quantity,
            tiers,
        })
    }

    /// Creates a line item carrying the product's current price data.
    pub fn from_product(product_key: ProductKey, product: &Product<'a>, quantity: u32) -> Self {
        Self {
            product: product_key,
            unit_price: *product.price(),
            quantity,
            tiers: product.tiers().clone(),
        }
    }

    /// Returns the product key
    pub fn product(&self) -> ProductKey {
        self.product
    }

    /// Returns the base price per unit
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Returns the quantity
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the volume tiers
    pub fn tiers(&self) -> &PriceTiers<'a> {
        &self.tiers
    }

    /// Replace the quantity.
    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }
}
