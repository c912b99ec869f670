//! Cart
//!
//! The mutable cart owned by a session. It holds line items only; totals are always
//! recomputed through [`PricingCalculator`](crate::pricing::PricingCalculator).

use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{items::LineItem, products::ProductKey};

/// Errors related to cart construction or mutation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// An item's currency differs from the cart currency (index, item currency, cart currency).
    #[error("Item {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// The product has no line in the cart.
    #[error("product is not in the cart")]
    ProductNotInCart(ProductKey),

    /// Merging quantities would exceed the representable range.
    #[error("quantity overflow for product")]
    QuantityOverflow(ProductKey),
}

/// Cart
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    items: Vec<LineItem<'a>>,
    currency: &'a Currency,
}

impl<'a> Cart<'a> {
    /// Create an empty cart.
    pub fn new(currency: &'a Currency) -> Self {
        Cart {
            items: Vec::new(),
            currency,
        }
    }

    /// Create a new cart with the given items.
    ///
    /// Items are added in order exactly as [`Cart::add`] would, so zero-quantity items are
    /// dropped and lines for the same product merge into one.
    ///
    /// # Errors
    ///
    /// - [`CartError::CurrencyMismatch`]: an item is priced in another currency; the error
    ///   names its index in `items`.
    /// - [`CartError::QuantityOverflow`]: merged quantities do not fit in a `u32`.
    pub fn with_items(
        items: impl IntoIterator<Item = LineItem<'a>>,
        currency: &'a Currency,
    ) -> Result<Self, CartError> {
        let mut cart = Cart::new(currency);

        for (idx, item) in items.into_iter().enumerate() {
            cart.merge(idx, item)?;
        }

        Ok(cart)
    }

    /// Add an item. An existing line for the same product absorbs the quantity.
    ///
    /// # Errors
    ///
    /// - [`CartError::CurrencyMismatch`]: the item is priced in another currency.
    /// - [`CartError::QuantityOverflow`]: the merged quantity does not fit in a `u32`.
    pub fn add(&mut self, item: LineItem<'a>) -> Result<(), CartError> {
        self.merge(self.items.len(), item)
    }

    fn merge(&mut self, idx: usize, item: LineItem<'a>) -> Result<(), CartError> {
        let item_currency = item.unit_price().currency();

        if item_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                idx,
                item_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        if item.quantity() == 0 {
            return Ok(());
        }

        match self.line_mut(item.product()) {
            Some(line) => {
                let quantity = line
                    .quantity()
                    .checked_add(item.quantity())
                    .ok_or(CartError::QuantityOverflow(item.product()))?;

                line.set_quantity(quantity);
            }
            None => self.items.push(item),
        }

        Ok(())
    }

    /// Set the quantity of a product's line. A quantity of zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ProductNotInCart`] if the product has no line.
    pub fn set_quantity(&mut self, product: ProductKey, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove(product).map(|_| ());
        }

        let line = self
            .line_mut(product)
            .ok_or(CartError::ProductNotInCart(product))?;

        line.set_quantity(quantity);

        Ok(())
    }

    /// Remove a product's line, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ProductNotInCart`] if the product has no line.
    pub fn remove(&mut self, product: ProductKey) -> Result<LineItem<'a>, CartError> {
        let idx = self
            .items
            .iter()
            .position(|item| item.product() == product)
            .ok_or(CartError::ProductNotInCart(product))?;

        Ok(self.items.remove(idx))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Lookup a product's line.
    pub fn get(&self, product: ProductKey) -> Option<&LineItem<'a>> {
        self.items.iter().find(|item| item.product() == product)
    }

    fn line_mut(&mut self, product: ProductKey) -> Option<&mut LineItem<'a>> {
        self.items.iter_mut().find(|item| item.product() == product)
    }

    /// Iterate lines in cart order.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem<'a>> {
        self.items.iter()
    }

    /// Lines in cart order.
    pub fn items(&self) -> &[LineItem<'a>] {
        &self.items
    }

    /// Get the number of lines in the cart.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }
}
