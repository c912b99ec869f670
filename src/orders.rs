//! Orders
//!
//! Order commit. Submitted lines carry a SKU and quantity; any price the client displayed is
//! only compared against, never charged. Each line is re-priced from the [`Catalog`] through
//! the same [`PricingCalculator`] the cart uses.

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    cart::{Cart, CartError},
    catalog::Catalog,
    items::LineItem,
    pricing::{LinePricing, PricingCalculator, PricingError},
    products::ProductKey,
};

/// Errors raised while committing an order.
#[derive(Debug, Error, PartialEq)]
pub enum OrderError {
    /// The request had no lines.
    #[error("order has no lines")]
    EmptyOrder,

    /// A line referenced a SKU missing from the catalog.
    #[error("unknown product: {0}")]
    UnknownProduct(String),

    /// A line asked for zero units.
    #[error("line for {0} has zero quantity")]
    ZeroQuantity(String),

    /// The catalog has no currency, so it has no products to sell.
    #[error("catalog is empty")]
    EmptyCatalog,

    /// The order is below the minimum unit count.
    #[error("order needs at least {required} units, {remaining} more required")]
    MinimumNotMet {
        /// Configured minimum
        required: u32,
        /// Units still missing
        remaining: u32,
    },

    /// Errors bubbled up from building the priced cart.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Errors bubbled up from price calculation.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// One submitted order line.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineRequest<'a> {
    /// Product SKU
    pub sku: String,

    /// Units requested
    pub quantity: u32,

    /// Unit price the buyer was shown, if the client sent one.
    pub quoted_unit_price: Option<Money<'a, Currency>>,
}

impl<'a> OrderLineRequest<'a> {
    /// Create a line without a quoted price.
    pub fn new(sku: impl Into<String>, quantity: u32) -> Self {
        Self {
            sku: sku.into(),
            quantity,
            quoted_unit_price: None,
        }
    }

    /// Attach the unit price the buyer was shown.
    #[must_use]
    pub fn quoted(mut self, price: Money<'a, Currency>) -> Self {
        self.quoted_unit_price = Some(price);
        self
    }
}

/// A submitted order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderRequest<'a> {
    /// Lines in submission order.
    pub lines: Vec<OrderLineRequest<'a>>,
}

impl<'a> OrderRequest<'a> {
    /// Build a request from a cart, quoting the prices the cart currently displays.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::UnknownProduct`] if a line's product is not in the catalog.
    pub fn from_cart(
        cart: &Cart<'a>,
        catalog: &Catalog<'a>,
        calculator: &PricingCalculator,
    ) -> Result<Self, OrderError> {
        let lines = cart
            .iter()
            .map(|item| {
                let product = catalog
                    .get(item.product())
                    .ok_or_else(|| OrderError::UnknownProduct(format!("{:?}", item.product())))?;

                Ok(OrderLineRequest::new(product.sku.clone(), item.quantity())
                    .quoted(calculator.effective_unit_price(item)))
            })
            .collect::<Result<Vec<_>, OrderError>>()?;

        Ok(Self { lines })
    }
}

/// A quoted price that disagreed with the authoritative price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceDiscrepancy<'a> {
    /// Product on the line
    pub product: ProductKey,

    /// Price the client showed
    pub quoted: Money<'a, Currency>,

    /// Price actually charged
    pub charged: Money<'a, Currency>,
}

/// A committed order line.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine<'a> {
    /// Product key
    pub product: ProductKey,

    /// Product SKU
    pub sku: String,

    /// Authoritative pricing for the line
    pub pricing: LinePricing<'a>,
}

/// A committed, re-priced order.
#[derive(Debug, Clone, PartialEq)]
pub struct Order<'a> {
    lines: Vec<OrderLine<'a>>,
    subtotal: Money<'a, Currency>,
    savings: Money<'a, Currency>,
    item_count: u64,
    discrepancies: Vec<PriceDiscrepancy<'a>>,
}

impl<'a> Order<'a> {
    /// Committed lines, one per distinct SKU in first-seen order.
    pub fn lines(&self) -> &[OrderLine<'a>] {
        &self.lines
    }

    /// Amount charged.
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Savings against base prices.
    pub fn savings(&self) -> Money<'a, Currency> {
        self.savings
    }

    /// Total units ordered.
    pub fn item_count(&self) -> u64 {
        self.item_count
    }

    /// Quoted prices that were overridden.
    pub fn discrepancies(&self) -> &[PriceDiscrepancy<'a>] {
        &self.discrepancies
    }
}

/// Re-price and commit an order against the catalog.
///
/// Lines for the same SKU are merged before pricing, so tier thresholds see the combined
/// quantity. Every quoted price, currency included, is compared against the merged line's
/// effective price; each mismatch is recorded as its own discrepancy.
///
/// # Errors
///
/// - [`OrderError::EmptyOrder`]: no lines were submitted.
/// - [`OrderError::UnknownProduct`]: a SKU is missing from the catalog.
/// - [`OrderError::ZeroQuantity`]: a line asked for zero units.
/// - [`OrderError::MinimumNotMet`]: the order is below the configured minimum.
/// - [`OrderError::Cart`] / [`OrderError::Pricing`]: quantity or price arithmetic failed.
pub fn place_order<'a>(
    catalog: &Catalog<'a>,
    request: &OrderRequest<'a>,
    calculator: &PricingCalculator,
) -> Result<Order<'a>, OrderError> {
    if request.lines.is_empty() {
        return Err(OrderError::EmptyOrder);
    }

    let currency = catalog.currency().ok_or(OrderError::EmptyCatalog)?;

    let mut cart = Cart::new(currency);
    let mut quotes: FxHashMap<ProductKey, Vec<Money<'a, Currency>>> = FxHashMap::default();

    for line in &request.lines {
        if line.quantity == 0 {
            return Err(OrderError::ZeroQuantity(line.sku.clone()));
        }

        let (key, product) = catalog
            .by_sku(&line.sku)
            .ok_or_else(|| OrderError::UnknownProduct(line.sku.clone()))?;

        cart.add(LineItem::from_product(key, product, line.quantity))?;

        if let Some(quoted) = line.quoted_unit_price {
            quotes.entry(key).or_default().push(quoted);
        }
    }

    let gate = calculator.minimum_order_gate(&cart);

    if !gate.met {
        return Err(OrderError::MinimumNotMet {
            required: calculator.config().minimum_order_units(),
            remaining: gate.remaining,
        });
    }

    let mut lines = Vec::with_capacity(cart.len());
    let mut discrepancies = Vec::new();

    for item in cart.iter() {
        let pricing = calculator.price_line(item)?;
        let sku = catalog
            .get(item.product())
            .map(|product| product.sku.clone())
            .unwrap_or_default();

        debug!(
            sku = %sku,
            quantity = pricing.quantity,
            effective_unit_price = %pricing.effective_unit_price,
            tier = ?pricing.applied_tier.map(|tier| tier.threshold()),
            "priced order line"
        );

        for quoted in quotes
            .get(&item.product())
            .into_iter()
            .flatten()
            .filter(|quoted| **quoted != pricing.effective_unit_price)
        {
            warn!(
                sku = %sku,
                quoted = %quoted,
                charged = %pricing.effective_unit_price,
                "quoted unit price differs from catalog price"
            );

            discrepancies.push(PriceDiscrepancy {
                product: item.product(),
                quoted: *quoted,
                charged: pricing.effective_unit_price,
            });
        }

        lines.push(OrderLine {
            product: item.product(),
            sku,
            pricing,
        });
    }

    let order = Order {
        lines,
        subtotal: calculator.cart_subtotal(&cart)?,
        savings: calculator.cart_savings(&cart)?,
        item_count: calculator.item_count(&cart),
        discrepancies,
    };

    info!(
        lines = order.lines.len(),
        units = order.item_count,
        subtotal = %order.subtotal,
        "order placed"
    );

    Ok(order)
}
