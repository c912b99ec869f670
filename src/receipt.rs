//! Receipt
//!
//! A priced snapshot of a cart and its terminal rendering.

use std::io;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::Cart,
    catalog::Catalog,
    pricing::{LinePricing, MinimumOrderGate, NearUpgrade, PricingCalculator, PricingError},
    products::ProductKey,
    tiers::PriceTier,
};

/// Errors that can occur when building or writing a cart summary.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Error pricing the cart.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Error finding a product in the product catalog.
    #[error("Missing product")]
    MissingProduct(ProductKey),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// One priced cart line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryLine<'a> {
    /// Product on the line
    pub product: ProductKey,

    /// Pricing for the line
    pub pricing: LinePricing<'a>,

    /// Next tier that would lower the unit price, if any
    pub next_tier: Option<PriceTier<'a>>,
}

/// Priced snapshot of a cart.
#[derive(Debug, Clone)]
pub struct CartSummary<'a> {
    lines: Vec<SummaryLine<'a>>,
    base_total: Money<'a, Currency>,
    subtotal: Money<'a, Currency>,
    savings: Money<'a, Currency>,
    savings_percent: Percentage,
    item_count: u64,
    minimum_order_units: u32,
    gate: MinimumOrderGate,
    near_upgrades: Vec<NearUpgrade<'a>>,
}

impl<'a> CartSummary<'a> {
    /// Price every line of the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if any total cannot be computed.
    pub fn build(cart: &Cart<'a>, calculator: &PricingCalculator) -> Result<Self, PricingError> {
        let lines = cart
            .iter()
            .map(|item| {
                Ok(SummaryLine {
                    product: item.product(),
                    pricing: calculator.price_line(item)?,
                    next_tier: item
                        .tiers()
                        .next_upgrade(item.quantity(), item.unit_price())
                        .copied(),
                })
            })
            .collect::<Result<Vec<_>, PricingError>>()?;

        // Only near tiers cheaper than the line's current price are prompted.
        let near_upgrades = calculator
            .near_upgrades(cart)
            .into_iter()
            .filter(|near| {
                lines.get(near.index).is_some_and(|line| {
                    near.tier.price().to_minor_units()
                        < line.pricing.effective_unit_price.to_minor_units()
                })
            })
            .collect();

        Ok(Self {
            lines,
            base_total: calculator.cart_base_total(cart)?,
            subtotal: calculator.cart_subtotal(cart)?,
            savings: calculator.cart_savings(cart)?,
            savings_percent: calculator.savings_percent(cart)?,
            item_count: calculator.item_count(cart),
            minimum_order_units: calculator.config().minimum_order_units(),
            gate: calculator.minimum_order_gate(cart),
            near_upgrades,
        })
    }

    /// Priced lines in cart order.
    pub fn lines(&self) -> &[SummaryLine<'a>] {
        &self.lines
    }

    /// Total before tiers.
    pub fn base_total(&self) -> Money<'a, Currency> {
        self.base_total
    }

    /// Total after tiers.
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Savings from tiers.
    pub fn savings(&self) -> Money<'a, Currency> {
        self.savings
    }

    /// Savings as a fraction of the base total. Zero for an empty cart.
    pub fn savings_percent(&self) -> Percentage {
        self.savings_percent
    }

    /// Total units.
    pub fn item_count(&self) -> u64 {
        self.item_count
    }

    /// Minimum order check.
    pub fn gate(&self) -> MinimumOrderGate {
        self.gate
    }

    /// Tiers the buyer is close to unlocking that would lower a line's unit price.
    pub fn near_upgrades(&self) -> &[NearUpgrade<'a>] {
        &self.near_upgrades
    }

    /// Writes the summary as a table followed by totals and upgrade hints.
    ///
    /// # Errors
    ///
    /// Returns an error if a product is missing from the catalog or the write fails.
    pub fn write_to(
        &self,
        mut out: impl io::Write,
        catalog: &Catalog<'_>,
    ) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record([
            "",
            "Item",
            "SKU",
            "Qty",
            "Base Price",
            "Unit Price",
            "Line Total",
            "Savings",
            "Tier",
            "Next Tier",
        ]);

        for (idx, line) in self.lines.iter().enumerate() {
            let product = catalog
                .get(line.product)
                .ok_or(ReceiptError::MissingProduct(line.product))?;

            let pricing = &line.pricing;

            let (unit_price, savings) = if pricing.applied_tier.is_some() {
                (
                    format!("{}", pricing.effective_unit_price),
                    format!("-{}", pricing.savings),
                )
            } else {
                (String::new(), String::new())
            };

            let tier = pricing
                .applied_tier
                .map(|tier| format!("{}+", tier.threshold()))
                .unwrap_or_default();

            let next_tier = line
                .next_tier
                .map(|tier| format!("{}+ @ {}", tier.threshold(), tier.price()))
                .unwrap_or_default();

            builder.push_record([
                format!("#{:<3}", idx + 1),
                product.name.clone(),
                product.sku.clone(),
                pricing.quantity.to_string(),
                format!("{}", pricing.unit_price),
                unit_price,
                format!("{}", pricing.total),
                savings,
                tier,
                next_tier,
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Columns::new(3..8), Alignment::right());
        table.modify(Rows::first(), Alignment::center());

        writeln!(out, "\n{table}")?;

        self.write_totals(&mut out)?;
        self.write_hints(&mut out, catalog)?;

        Ok(())
    }

    fn write_totals(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let savings_points = percent_points(self.savings_percent());

        writeln!(out, "    Base total:  {}", self.base_total)?;
        writeln!(out, "      Subtotal:  {}", self.subtotal)?;
        writeln!(out, "       Savings:  ({savings_points:.2}%) {}", self.savings)?;
        writeln!(out, "         Units:  {}", self.item_count)?;

        if self.gate.met {
            writeln!(out, " Minimum order:  met ({} units)", self.minimum_order_units)?;
        } else {
            writeln!(
                out,
                " Minimum order:  {} more units needed (minimum {})",
                self.gate.remaining, self.minimum_order_units
            )?;
        }

        Ok(())
    }

    fn write_hints(
        &self,
        out: &mut impl io::Write,
        catalog: &Catalog<'_>,
    ) -> Result<(), ReceiptError> {
        if self.near_upgrades.is_empty() {
            return Ok(());
        }

        writeln!(out)?;

        for near in &self.near_upgrades {
            let product = catalog
                .get(near.product)
                .ok_or(ReceiptError::MissingProduct(near.product))?;

            writeln!(
                out,
                " Add {} more {} to pay {} each ({}+ units)",
                near.units_remaining,
                product.name,
                near.tier.price(),
                near.tier.threshold()
            )?;
        }

        Ok(())
    }
}

/// Converts a fractional percentage to percent points for display.
fn percent_points(percentage: Percentage) -> Decimal {
    // `Percentage` is a fraction (e.g. 0.25), so multiply by 100 to print percent points.
    ((percentage * Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(2)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use crate::{
        items::LineItem,
        products::Product,
        tiers::{PriceTier, PriceTiers},
    };

    use super::*;

    fn gbp(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, GBP)
    }

    fn catalog_and_cart() -> TestResult<(Catalog<'static>, Cart<'static>)> {
        let mut catalog = Catalog::new();

        let case = catalog.insert(Product::new(
            "Silicone case",
            "CASE-01",
            gbp(2500),
            PriceTiers::from_legacy(
                Some(PriceTier::new(20, gbp(2000))?),
                Some(PriceTier::new(15, gbp(1500))?),
            )?,
        )?)?;
        let charger = catalog.insert(Product::new(
            "Wall charger",
            "CHG-01",
            gbp(800),
            PriceTiers::new([PriceTier::new(30, gbp(650))?])?,
        )?)?;

        let mut cart = Cart::new(GBP);

        for (key, quantity) in [(case, 15), (charger, 24)] {
            let Some(product) = catalog.get(key) else {
                panic!("product was just inserted");
            };

            cart.add(LineItem::from_product(key, product, quantity))?;
        }

        Ok((catalog, cart))
    }

    #[test]
    fn build_snapshots_cart_totals() -> TestResult {
        let (_, cart) = catalog_and_cart()?;

        let summary = CartSummary::build(&cart, &PricingCalculator::default())?;

        assert_eq!(summary.lines().len(), 2);
        assert_eq!(summary.subtotal(), gbp(22500 + 24 * 800));
        assert_eq!(summary.savings(), gbp(15000));
        assert_eq!(summary.item_count(), 39);
        assert!(summary.gate().met);
        assert_eq!(summary.near_upgrades().len(), 1);

        Ok(())
    }

    #[test]
    fn write_to_renders_lines_and_hints() -> TestResult {
        let (catalog, cart) = catalog_and_cart()?;
        let summary = CartSummary::build(&cart, &PricingCalculator::default())?;

        let mut out = Vec::new();
        summary.write_to(&mut out, &catalog)?;
        let text = String::from_utf8(out)?;

        assert!(text.contains("Silicone case"), "missing product row: {text}");
        assert!(text.contains("15+"), "missing tier column: {text}");
        assert!(
            text.contains("Add 6 more Wall charger"),
            "missing upgrade hint: {text}"
        );
        assert!(text.contains("Minimum order:  met"), "missing gate: {text}");

        Ok(())
    }

    #[test]
    fn savings_percent_comes_from_calculator() -> TestResult {
        let (_, cart) = catalog_and_cart()?;
        let calc = PricingCalculator::default();

        let summary = CartSummary::build(&cart, &calc)?;

        assert_eq!(summary.savings_percent(), calc.savings_percent(&cart)?);

        Ok(())
    }

    #[test]
    fn next_tier_column_names_cheaper_locked_tier() -> TestResult {
        let (catalog, cart) = catalog_and_cart()?;
        let summary = CartSummary::build(&cart, &PricingCalculator::default())?;

        let next: Vec<Option<u32>> = summary
            .lines()
            .iter()
            .map(|line| line.next_tier.map(|tier| tier.threshold()))
            .collect();

        // The case's locked 20+ tier costs more than the 15+ tier it already has.
        assert_eq!(next, vec![None, Some(30)]);

        let mut out = Vec::new();
        summary.write_to(&mut out, &catalog)?;
        let text = String::from_utf8(out)?;

        assert!(text.contains("30+ @ £6.50"), "missing next tier: {text}");

        Ok(())
    }

    #[test]
    fn near_tier_that_costs_more_is_not_prompted() -> TestResult {
        let mut catalog = Catalog::new();
        let cable = catalog.insert(Product::new(
            "USB-C cable",
            "CAB-01",
            gbp(600),
            PriceTiers::new([PriceTier::new(20, gbp(500))?, PriceTier::new(25, gbp(550))?])?,
        )?)?;
        let product = catalog.get(cable).ok_or("missing cable")?;

        let mut cart = Cart::new(GBP);
        cart.add(LineItem::from_product(cable, product, 20))?;

        let calc = PricingCalculator::default();
        let summary = CartSummary::build(&cart, &calc)?;

        assert_eq!(calc.near_upgrades(&cart).len(), 1);
        assert!(summary.near_upgrades().is_empty());

        let mut out = Vec::new();
        summary.write_to(&mut out, &catalog)?;
        let text = String::from_utf8(out)?;

        assert!(!text.contains("Add 5 more"), "unexpected hint: {text}");

        Ok(())
    }

    #[test]
    fn write_to_reports_missing_product() -> TestResult {
        let (_, cart) = catalog_and_cart()?;
        let summary = CartSummary::build(&cart, &PricingCalculator::default())?;

        let result = summary.write_to(Vec::new(), &Catalog::new());

        assert!(matches!(result, Err(ReceiptError::MissingProduct(_))));

        Ok(())
    }

    #[test]
    fn percent_points_scales_fraction() {
        let points = percent_points(Percentage::from(0.25));

        assert_eq!(points, Decimal::new(25, 0));
    }
}
