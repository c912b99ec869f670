//! Integration test for the accessories fixture set.
//!
//! Expected pricing:
//!
//! 1. Silicone case x15 at £25.00 - super wholesale (15+) unlocks at £15.00, the 20+
//!    special tier is still locked. Line £225.00, saves £150.00.
//! 2. Lanyard x5 at £10.00 - no tiers. Line £50.00.
//! 3. Wall charger x24 at £8.00 - 30+ tier locked, 80% of the way there. Line £192.00.
//! 4. Tempered glass x45 at £3.00 - 50+ tier locked at 90%, 100+ tier at 45%. Line £135.00.
//! 5. USB-C cable x20 at £6.00 - 20+ tier unlocks £5.00. Line £100.00, saves £20.00.
//!
//! Subtotal £702.00, base total £872.00, savings £170.00, 109 units.

use rusty_money::{Money, iso::GBP};
use testresult::TestResult;

use wholesale::prelude::*;

fn gbp(minor: i64) -> Money<'static, rusty_money::iso::Currency> {
    Money::from_minor(minor, GBP)
}

#[test]
fn fixture_cart_totals() -> TestResult {
    let fixture = Fixture::from_set("accessories")?;
    let cart = fixture.cart()?;
    let calc = PricingCalculator::default();

    assert_eq!(fixture.catalog().len(), 5);
    assert_eq!(cart.len(), 5);
    assert_eq!(calc.cart_subtotal(&cart)?, gbp(70_200));
    assert_eq!(calc.cart_base_total(&cart)?, gbp(87_200));
    assert_eq!(calc.cart_savings(&cart)?, gbp(17_000));
    assert_eq!(calc.item_count(&cart), 109);
    assert!(calc.minimum_order_gate(&cart).met);

    Ok(())
}

#[test]
fn fixture_near_upgrades() -> TestResult {
    let fixture = Fixture::from_set("accessories")?;
    let cart = fixture.cart()?;
    let calc = PricingCalculator::default();

    let near: Vec<(String, u32, u32)> = calc
        .near_upgrades(&cart)
        .into_iter()
        .filter_map(|near| {
            let product = fixture.catalog().get(near.product)?;
            Some((product.sku.clone(), near.tier.threshold(), near.units_remaining))
        })
        .collect();

    assert_eq!(
        near,
        vec![("CHG-01".to_string(), 30, 6), ("GLS-01".to_string(), 50, 5)]
    );
    assert_eq!(calc.near_upgrade_items(&cart).len(), 2);

    Ok(())
}

#[test]
fn cart_mutations_are_reflected_on_recompute() -> TestResult {
    let fixture = Fixture::from_set("accessories")?;
    let mut cart = fixture.cart()?;
    let calc = PricingCalculator::default();

    let charger = fixture.catalog().key_for_sku("CHG-01").ok_or("missing CHG-01")?;

    // Topping the charger up to 30 unlocks its tier.
    cart.set_quantity(charger, 30)?;

    assert_eq!(
        cart.get(charger).map(|item| calc.effective_unit_price(item)),
        Some(gbp(650))
    );
    assert_eq!(calc.cart_subtotal(&cart)?, gbp(70_200 - 19_200 + 19_500));
    assert_eq!(calc.near_upgrade_items(&cart).len(), 1);

    cart.remove(charger)?;

    assert_eq!(calc.item_count(&cart), 85);
    assert!(cart.get(charger).is_none());

    Ok(())
}

#[test]
fn fixture_order_matches_cart_view() -> TestResult {
    let fixture = Fixture::from_set("accessories")?;
    let cart = fixture.cart()?;
    let calc = PricingCalculator::default();

    let order = place_order(fixture.catalog(), &fixture.order_request(), &calc)?;

    assert_eq!(order.subtotal(), calc.cart_subtotal(&cart)?);
    assert_eq!(order.savings(), calc.cart_savings(&cart)?);
    assert_eq!(order.item_count(), calc.item_count(&cart));
    assert!(order.discrepancies().is_empty());

    Ok(())
}

#[test]
fn raised_minimum_blocks_fixture_order() -> TestResult {
    let fixture = Fixture::from_set("accessories")?;
    let floor = PricingConfig::default().near_upgrade_floor();
    let calc = PricingCalculator::new(PricingConfig::new(120, floor)?);

    let result = place_order(fixture.catalog(), &fixture.order_request(), &calc);

    assert_eq!(
        result,
        Err(OrderError::MinimumNotMet {
            required: 120,
            remaining: 11
        })
    );

    Ok(())
}

#[test]
fn summary_renders_fixture_cart() -> TestResult {
    let fixture = Fixture::from_set("accessories")?;
    let cart = fixture.cart()?;

    let mut out = Vec::new();
    CartSummary::build(&cart, &PricingCalculator::default())?
        .write_to(&mut out, fixture.catalog())?;
    let text = String::from_utf8(out)?;

    assert!(text.contains("£702.00"), "missing subtotal: {text}");
    assert!(text.contains("Add 5 more Tempered glass"), "missing hint: {text}");

    Ok(())
}
