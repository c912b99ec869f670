//! Fixtures
//!
//! YAML catalog and cart data sets. A set named `accessories` lives at
//! `<base>/products/accessories.yml` and `<base>/carts/accessories.yml`.

use std::{fs, path::PathBuf};

use thiserror::Error;

use crate::{
    cart::{Cart, CartError},
    catalog::{Catalog, CatalogError},
    fixtures::{
        carts::{CartFixture, CartLineFixture},
        products::ProductsFixture,
    },
    items::LineItem,
    orders::{OrderLineRequest, OrderRequest},
    tiers::TierError,
};

pub mod carts;
pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,

    /// Invalid tier data
    #[error(transparent)]
    Tier(#[from] TierError),

    /// Catalog construction error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Cart creation error
    #[error("Failed to create cart: {0}")]
    Cart(#[from] CartError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    catalog: Catalog<'static>,

    /// Cart lines by SKU, resolved against the catalog on demand
    cart_lines: Vec<CartLineFixture>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: Catalog::new(),
            cart_lines: Vec::new(),
        }
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a price or tier is invalid,
    /// or products disagree on currency.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("products").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: ProductsFixture = serde_norway::from_str(&contents)?;

        // Map iteration order is arbitrary; sort so product keys are stable between runs.
        let mut products: Vec<_> = fixture.products.into_iter().collect();
        products.sort_by(|(a, _), (b, _)| a.cmp(b));

        for (sku, product_fixture) in products {
            let product = product_fixture.try_into_product(sku)?;

            self.catalog.insert(product)?;
        }

        Ok(self)
    }

    /// Load cart lines from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a referenced product
    /// doesn't exist.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("carts").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CartFixture = serde_norway::from_str(&contents)?;

        for line in fixture.items {
            if self.catalog.key_for_sku(&line.product).is_none() {
                return Err(FixtureError::ProductNotFound(line.product));
            }

            self.cart_lines.push(line);
        }

        Ok(self)
    }

    /// Load a complete fixture set from `./fixtures`
    ///
    /// # Errors
    ///
    /// Returns an error if any part of the set fails to load.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::from_set_in("./fixtures", name)
    }

    /// Load a complete fixture set from a custom base path
    ///
    /// # Errors
    ///
    /// Returns an error if any part of the set fails to load.
    pub fn from_set_in(base_path: impl Into<PathBuf>, name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::with_base_path(base_path);

        fixture.load_products(name)?.load_cart(name)?;

        Ok(fixture)
    }

    /// The loaded catalog
    pub fn catalog(&self) -> &Catalog<'static> {
        &self.catalog
    }

    /// Build a cart from the loaded cart lines.
    ///
    /// # Errors
    ///
    /// Returns an error if no products are loaded or a line references a missing product.
    pub fn cart(&self) -> Result<Cart<'static>, FixtureError> {
        let currency = self.catalog.currency().ok_or(FixtureError::NoCurrency)?;
        let mut cart = Cart::new(currency);

        for line in &self.cart_lines {
            let (key, product) = self
                .catalog
                .by_sku(&line.product)
                .ok_or_else(|| FixtureError::ProductNotFound(line.product.clone()))?;

            cart.add(LineItem::from_product(key, product, line.quantity))?;
        }

        Ok(cart)
    }

    /// Build an order request from the loaded cart lines, without quoted prices.
    pub fn order_request(&self) -> OrderRequest<'static> {
        OrderRequest {
            lines: self
                .cart_lines
                .iter()
                .map(|line| OrderLineRequest::new(line.product.clone(), line.quantity))
                .collect(),
        }
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
