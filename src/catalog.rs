//! Catalog
//!
//! The authoritative product and price data. Order commit always re-prices from here.

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use slotmap::SlotMap;
use thiserror::Error;

use crate::products::{Product, ProductKey};

/// Errors raised while building a catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// A product with this SKU already exists.
    #[error("duplicate SKU: {0}")]
    DuplicateSku(String),

    /// A product is priced in a different currency (sku, product currency, catalog currency).
    #[error("Product {0} has currency {1}, but catalog has currency {2}")]
    CurrencyMismatch(String, &'static str, &'static str),
}

/// Product catalog, single currency.
#[derive(Debug, Default)]
pub struct Catalog<'a> {
    products: SlotMap<ProductKey, Product<'a>>,
    skus: FxHashMap<String, ProductKey>,
    currency: Option<&'a Currency>,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog. The first product inserted fixes its currency.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty catalog in the given currency.
    pub fn with_currency(currency: &'a Currency) -> Self {
        Self {
            currency: Some(currency),
            ..Self::default()
        }
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::DuplicateSku`]: the SKU is already present.
    /// - [`CatalogError::CurrencyMismatch`]: the product currency differs from the catalog's.
    pub fn insert(&mut self, product: Product<'a>) -> Result<ProductKey, CatalogError> {
        if self.skus.contains_key(&product.sku) {
            return Err(CatalogError::DuplicateSku(product.sku));
        }

        let currency = product.price().currency();

        match self.currency {
            Some(existing) if existing != currency => {
                return Err(CatalogError::CurrencyMismatch(
                    product.sku,
                    currency.iso_alpha_code,
                    existing.iso_alpha_code,
                ));
            }
            Some(_) => {}
            None => self.currency = Some(currency),
        }

        let sku = product.sku.clone();
        let key = self.products.insert(product);

        self.skus.insert(sku, key);

        Ok(key)
    }

    /// Lookup a product by key.
    pub fn get(&self, key: ProductKey) -> Option<&Product<'a>> {
        self.products.get(key)
    }

    /// Lookup a product by SKU.
    pub fn by_sku(&self, sku: &str) -> Option<(ProductKey, &Product<'a>)> {
        let key = self.key_for_sku(sku)?;

        self.products.get(key).map(|product| (key, product))
    }

    /// Lookup a product key by SKU.
    pub fn key_for_sku(&self, sku: &str) -> Option<ProductKey> {
        self.skus.get(sku).copied()
    }

    /// Iterate all products.
    pub fn iter(&self) -> impl Iterator<Item = (ProductKey, &Product<'a>)> {
        self.products.iter()
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// True when the catalog has no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Catalog currency, once known.
    pub fn currency(&self) -> Option<&'a Currency> {
        self.currency
    }
}
