//! Product Fixtures

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    products::Product,
    tiers::{PriceTier, PriceTiers},
};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of SKU -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product Fixture
///
/// Tiers can be given through the storefront's named `special_*` / `super_wholesale_*`
/// fields, a generic `tiers` list, or both.
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Base unit price (e.g., "25.00 GBP")
    pub price: String,

    /// Special tier price
    pub special_price: Option<String>,

    /// Special tier quantity threshold
    pub special_quantity: Option<u32>,

    /// Super wholesale tier price
    pub super_wholesale_price: Option<String>,

    /// Super wholesale tier quantity threshold
    pub super_wholesale_quantity: Option<u32>,

    /// Additional tiers
    #[serde(default)]
    pub tiers: Vec<TierFixture>,
}

/// Tier Fixture
#[derive(Debug, Deserialize)]
pub struct TierFixture {
    /// Quantity threshold
    pub quantity: u32,

    /// Unit price once unlocked
    pub price: String,
}

impl ProductFixture {
    /// Convert into a product with the given SKU.
    ///
    /// # Errors
    ///
    /// Returns an error if a price cannot be parsed or the tiers are invalid.
    pub fn try_into_product(self, sku: String) -> Result<Product<'static>, FixtureError> {
        let price = parse_money(&self.price)?;

        let special = PriceTier::from_parts(
            "special",
            self.special_price.as_deref().map(parse_money).transpose()?,
            self.special_quantity,
        )?;

        let super_wholesale = PriceTier::from_parts(
            "super wholesale",
            self.super_wholesale_price
                .as_deref()
                .map(parse_money)
                .transpose()?,
            self.super_wholesale_quantity,
        )?;

        let mut listed = Vec::with_capacity(self.tiers.len());

        for tier in &self.tiers {
            listed.push(PriceTier::new(tier.quantity, parse_money(&tier.price)?)?);
        }

        let tiers = PriceTiers::new(special.into_iter().chain(super_wholesale).chain(listed))?;

        Ok(Product::new(self.name, sku, price, tiers)?)
    }
}

/// Parse a price string into money.
///
/// # Errors
///
/// See [`parse_price`].
pub fn parse_money(s: &str) -> Result<Money<'static, Currency>, FixtureError> {
    let (minor_units, currency) = parse_price(s)?;

    Ok(Money::from_minor(minor_units, currency))
}

/// Parse price string (e.g., "2.99 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    if amount.is_sign_negative() {
        return Err(FixtureError::InvalidPrice(s.to_string()));
    }

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    Ok((minor_units, currency))
}
