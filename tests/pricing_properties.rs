//! Seeded randomized checks over generated carts.

use rand::{Rng, SeedableRng, rngs::StdRng};
use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{Currency, GBP},
};
use slotmap::SlotMap;
use testresult::TestResult;

use wholesale::prelude::*;

const SEED: u64 = 0x5EED_CA27;
const CARTS: usize = 200;

fn gbp(minor: i64) -> Money<'static, Currency> {
    Money::from_minor(minor, GBP)
}

/// Random tiers priced at or below `base_minor`, with distinct thresholds.
fn random_tiers(rng: &mut StdRng, base_minor: i64) -> TestResult<PriceTiers<'static>> {
    let mut thresholds: Vec<u32> = (0..rng.random_range(0..=3))
        .map(|_| rng.random_range(1..=120))
        .collect();

    thresholds.sort_unstable();
    thresholds.dedup();

    let mut tiers = Vec::with_capacity(thresholds.len());

    for threshold in thresholds {
        tiers.push(PriceTier::new(threshold, gbp(rng.random_range(1..=base_minor)))?);
    }

    Ok(PriceTiers::new(tiers)?)
}

fn random_cart(rng: &mut StdRng, keys: &mut SlotMap<ProductKey, ()>) -> TestResult<Cart<'static>> {
    let mut cart = Cart::new(GBP);

    for _ in 0..rng.random_range(0..=8) {
        let base_minor = rng.random_range(1..=5_000);
        let tiers = random_tiers(rng, base_minor)?;

        cart.add(LineItem::new(
            keys.insert(()),
            gbp(base_minor),
            rng.random_range(1..=150),
            tiers,
        )?)?;
    }

    Ok(cart)
}

#[test]
fn generated_carts_hold_pricing_invariants() -> TestResult {
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut keys = SlotMap::with_key();
    let calc = PricingCalculator::default();
    let floor = calc.config().near_upgrade_floor();

    for _ in 0..CARTS {
        let cart = random_cart(&mut rng, &mut keys)?;

        let mut line_sum = 0_i64;

        for item in cart.iter() {
            let effective = calc.effective_unit_price(item);

            assert!(effective.to_minor_units() <= item.unit_price().to_minor_units());
            assert!(calc.line_savings(item)?.to_minor_units() >= 0);

            line_sum += calc.line_total(item)?.to_minor_units();
        }

        assert_eq!(calc.cart_subtotal(&cart)?, gbp(line_sum));
        assert!(calc.cart_savings(&cart)?.to_minor_units() >= 0);
        let base_minor = calc.cart_base_total(&cart)?.to_minor_units();
        let savings_minor = calc.cart_savings(&cart)?.to_minor_units();

        assert_eq!(base_minor - savings_minor, line_sum);

        for near in calc.near_upgrades(&cart) {
            assert!(near.ratio >= floor, "ratio {} below floor", near.ratio);
            assert!(near.ratio < Decimal::ONE, "unlocked tier reported as near");
            assert!(near.units_remaining > 0);
        }

        let gate = calc.minimum_order_gate(&cart);

        assert_eq!(gate.met, calc.item_count(&cart) >= 30);
        assert_eq!(gate.met, gate.remaining == 0);
    }

    Ok(())
}

#[test]
fn doubling_quantity_never_raises_the_unit_price() -> TestResult {
    let mut rng = StdRng::seed_from_u64(SEED ^ 1);
    let mut keys = SlotMap::with_key();
    let calc = PricingCalculator::default();

    for _ in 0..CARTS {
        let cart = random_cart(&mut rng, &mut keys)?;

        for item in cart.iter() {
            let mut larger = item.clone();
            larger.set_quantity(item.quantity().saturating_mul(2));

            assert!(
                calc.effective_unit_price(&larger).to_minor_units()
                    <= calc.effective_unit_price(item).to_minor_units()
            );
        }
    }

    Ok(())
}
