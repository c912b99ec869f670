//! Volume Tiers Example
//!
//! Builds a two-product catalog in code, fills a cart just short of a case tier,
//! prints the summary, then tops the line up and commits the order.
//!
//! Run with: `cargo run --example volume_tiers`

use std::io;

use anyhow::{Result, anyhow};
use rusty_money::{Money, iso};

use wholesale::prelude::*;

/// Volume Tiers Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    let mut catalog = Catalog::new();

    let case_key = catalog.insert(Product::new(
        "Silicone case",
        "CASE-01",
        Money::from_minor(25_00, iso::GBP),
        PriceTiers::from_legacy(
            Some(PriceTier::new(20, Money::from_minor(20_00, iso::GBP))?),
            Some(PriceTier::new(50, Money::from_minor(15_00, iso::GBP))?),
        )?,
    )?)?;

    let lanyard_key = catalog.insert(Product::untiered(
        "Lanyard",
        "LAN-01",
        Money::from_minor(10_00, iso::GBP),
    ))?;

    let case = catalog
        .get(case_key)
        .ok_or(anyhow!("case product not found"))?;

    let lanyard = catalog
        .get(lanyard_key)
        .ok_or(anyhow!("lanyard product not found"))?;

    let mut cart = Cart::new(iso::GBP);

    cart.add(LineItem::from_product(case_key, case, 17))?;
    cart.add(LineItem::from_product(lanyard_key, lanyard, 10))?;

    let calculator = PricingCalculator::default();

    CartSummary::build(&cart, &calculator)?.write_to(io::stdout(), &catalog)?;

    // Three more cases unlock the 20+ tier.
    cart.set_quantity(case_key, 20)?;

    CartSummary::build(&cart, &calculator)?.write_to(io::stdout(), &catalog)?;

    let order = place_order(
        &catalog,
        &OrderRequest::from_cart(&cart, &catalog, &calculator)?,
        &calculator,
    )?;

    println!(
        "\n Order: {} units, {} (saved {})",
        order.item_count(),
        order.subtotal(),
        order.savings()
    );

    Ok(())
}
