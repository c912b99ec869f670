//! Pricing
//!
//! Tiered wholesale pricing over a cart snapshot. Every operation is a pure function of the
//! cart passed in and the calculator's [`PricingConfig`]; nothing is cached between calls, so
//! the interactive cart and order commit get identical answers for identical inputs.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;
use tracing::warn;

use crate::{cart::Cart, items::LineItem, products::ProductKey, tiers::PriceTier};

/// Cart-wide unit count required before checkout.
pub const DEFAULT_MINIMUM_ORDER_UNITS: u32 = 30;

/// Fraction of a tier threshold at which a line counts as "near" unlocking it (0.8).
pub const DEFAULT_NEAR_UPGRADE_FLOOR: Decimal = Decimal::from_parts(8, 0, 0, false, 1);

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Minor-unit arithmetic overflowed.
    #[error("price arithmetic overflowed")]
    Overflow,

    /// The near-upgrade floor must lie strictly between 0 and 1.
    #[error("near-upgrade floor must be between 0 and 1 (exclusive), got {0}")]
    InvalidNearUpgradeFloor(Decimal),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Deployment-level pricing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingConfig {
    minimum_order_units: u32,
    near_upgrade_floor: Decimal,
}

impl PricingConfig {
    /// Create a pricing config.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidNearUpgradeFloor`] if the floor is not in `(0, 1)`.
    pub fn new(
        minimum_order_units: u32,
        near_upgrade_floor: Decimal,
    ) -> Result<Self, PricingError> {
        if near_upgrade_floor <= Decimal::ZERO || near_upgrade_floor >= Decimal::ONE {
            return Err(PricingError::InvalidNearUpgradeFloor(near_upgrade_floor));
        }

        Ok(Self {
            minimum_order_units,
            near_upgrade_floor,
        })
    }

    /// Minimum units across the whole cart.
    pub fn minimum_order_units(&self) -> u32 {
        self.minimum_order_units
    }

    /// Near-upgrade floor as a fraction of the tier threshold.
    pub fn near_upgrade_floor(&self) -> Decimal {
        self.near_upgrade_floor
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            minimum_order_units: DEFAULT_MINIMUM_ORDER_UNITS,
            near_upgrade_floor: DEFAULT_NEAR_UPGRADE_FLOOR,
        }
    }
}

/// Outcome of the minimum order check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinimumOrderGate {
    /// Whether the cart holds enough units to check out.
    pub met: bool,

    /// Units still required; zero once met.
    pub remaining: u32,
}

/// A cart line that is close to unlocking one of its tiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearUpgrade<'a> {
    /// Index of the line in the cart.
    pub index: usize,

    /// Product on the line.
    pub product: ProductKey,

    /// The tier that is nearly unlocked.
    pub tier: PriceTier<'a>,

    /// `quantity / threshold`, always in `[floor, 1)`.
    pub ratio: Decimal,

    /// Units to add to unlock the tier.
    pub units_remaining: u32,
}

/// Priced snapshot of one line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePricing<'a> {
    /// Units on the line.
    pub quantity: u32,

    /// Base unit price.
    pub unit_price: Money<'a, Currency>,

    /// Unit price actually charged.
    pub effective_unit_price: Money<'a, Currency>,

    /// Tier that set the effective price, if any.
    pub applied_tier: Option<PriceTier<'a>>,

    /// `unit_price * quantity`.
    pub base_total: Money<'a, Currency>,

    /// `effective_unit_price * quantity`.
    pub total: Money<'a, Currency>,

    /// `base_total - total`, never negative.
    pub savings: Money<'a, Currency>,
}

/// Stateless tiered pricing calculator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PricingCalculator {
    config: PricingConfig,
}

impl PricingCalculator {
    /// Create a calculator with the given rules.
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    /// The rules this calculator applies.
    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// The unit price charged for a line.
    ///
    /// The cheapest tier whose threshold the quantity meets wins. With no tier met, or a
    /// quantity of zero, the base price applies.
    pub fn effective_unit_price<'a>(&self, item: &LineItem<'a>) -> Money<'a, Currency> {
        item.tiers()
            .best_met(item.quantity())
            .map_or(*item.unit_price(), |tier| *tier.price())
    }

    /// `effective_unit_price * quantity`.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the total does not fit in minor units.
    pub fn line_total<'a>(&self, item: &LineItem<'a>) -> Result<Money<'a, Currency>, PricingError> {
        multiply(&self.effective_unit_price(item), item.quantity())
    }

    /// `unit_price * quantity`, the line total without any tier.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the total does not fit in minor units.
    pub fn line_base_total<'a>(
        &self,
        item: &LineItem<'a>,
    ) -> Result<Money<'a, Currency>, PricingError> {
        multiply(item.unit_price(), item.quantity())
    }

    /// What the buyer saves on a line relative to the base price.
    ///
    /// A tier priced above the base price would produce negative savings; those are clamped
    /// to zero and reported as a data-integrity warning.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if a total does not fit in minor units.
    pub fn line_savings<'a>(
        &self,
        item: &LineItem<'a>,
    ) -> Result<Money<'a, Currency>, PricingError> {
        let base = self.line_base_total(item)?;
        let total = self.line_total(item)?;

        let savings = base
            .to_minor_units()
            .checked_sub(total.to_minor_units())
            .ok_or(PricingError::Overflow)?;

        if savings < 0 {
            warn!(
                product = ?item.product(),
                unit_price = %item.unit_price(),
                effective_unit_price = %self.effective_unit_price(item),
                "tier price exceeds base price; clamping savings to zero"
            );
        }

        Ok(Money::from_minor(savings.max(0), item.unit_price().currency()))
    }

    /// Price a single line in one pass.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if a total does not fit in minor units.
    pub fn price_line<'a>(&self, item: &LineItem<'a>) -> Result<LinePricing<'a>, PricingError> {
        let applied_tier = item.tiers().best_met(item.quantity()).copied();

        Ok(LinePricing {
            quantity: item.quantity(),
            unit_price: *item.unit_price(),
            effective_unit_price: self.effective_unit_price(item),
            applied_tier,
            base_total: self.line_base_total(item)?,
            total: self.line_total(item)?,
            savings: self.line_savings(item)?,
        })
    }

    /// Sum of line totals. An empty cart totals zero in the cart currency.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] on overflow or a currency mismatch.
    pub fn cart_subtotal<'a>(&self, cart: &Cart<'a>) -> Result<Money<'a, Currency>, PricingError> {
        sum(cart, |item| self.line_total(item))
    }

    /// Sum of line base totals, before tiers.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] on overflow or a currency mismatch.
    pub fn cart_base_total<'a>(
        &self,
        cart: &Cart<'a>,
    ) -> Result<Money<'a, Currency>, PricingError> {
        sum(cart, |item| self.line_base_total(item))
    }

    /// Sum of line savings.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] on overflow or a currency mismatch.
    pub fn cart_savings<'a>(&self, cart: &Cart<'a>) -> Result<Money<'a, Currency>, PricingError> {
        sum(cart, |item| self.line_savings(item))
    }

    /// Cart savings as a fraction of the base total. Zero for an empty cart.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] on overflow or a currency mismatch.
    pub fn savings_percent(&self, cart: &Cart<'_>) -> Result<Percentage, PricingError> {
        let base_minor = self.cart_base_total(cart)?.to_minor_units();

        if base_minor == 0 {
            return Ok(Percentage::from(0.0));
        }

        let savings_minor = self.cart_savings(cart)?.to_minor_units();

        Ok(Percentage::from(
            Decimal::from(savings_minor) / Decimal::from(base_minor),
        ))
    }

    /// Total units across all lines.
    pub fn item_count(&self, cart: &Cart<'_>) -> u64 {
        cart.iter().map(|item| u64::from(item.quantity())).sum()
    }

    /// Every (line, tier) pair where the line is within the near-upgrade band of the tier.
    ///
    /// The band is `[floor, 1)` of the threshold: an unlocked tier is never "near".
    pub fn near_upgrades<'a>(&self, cart: &Cart<'a>) -> Vec<NearUpgrade<'a>> {
        let floor = self.config.near_upgrade_floor;

        cart.iter()
            .enumerate()
            .flat_map(|(index, item)| {
                let quantity = item.quantity();

                item.tiers()
                    .iter()
                    .filter(move |tier| is_near(quantity, tier.threshold(), floor))
                    .map(move |tier| NearUpgrade {
                        index,
                        product: item.product(),
                        tier: *tier,
                        ratio: Decimal::from(quantity) / Decimal::from(tier.threshold()),
                        units_remaining: tier.threshold() - quantity,
                    })
            })
            .collect()
    }

    /// Lines near unlocking at least one tier, in cart order.
    pub fn near_upgrade_items<'c, 'a>(&self, cart: &'c Cart<'a>) -> Vec<&'c LineItem<'a>> {
        let floor = self.config.near_upgrade_floor;

        cart.iter()
            .filter(|item| {
                item.tiers()
                    .iter()
                    .any(|tier| is_near(item.quantity(), tier.threshold(), floor))
            })
            .collect()
    }

    /// Minimum order check against the configured minimum.
    pub fn minimum_order_gate(&self, cart: &Cart<'_>) -> MinimumOrderGate {
        self.minimum_order_gate_for(cart, self.config.minimum_order_units)
    }

    /// Minimum order check against an explicit minimum.
    pub fn minimum_order_gate_for(&self, cart: &Cart<'_>, minimum_units: u32) -> MinimumOrderGate {
        gate(self.item_count(cart), minimum_units)
    }
}

/// Minimum order check for a raw unit count.
pub(crate) fn gate(count: u64, minimum_units: u32) -> MinimumOrderGate {
    // A count too large for u32 is necessarily above the minimum.
    let remaining = u32::try_from(count).map_or(0, |count| minimum_units.saturating_sub(count));

    MinimumOrderGate {
        met: count >= u64::from(minimum_units),
        remaining,
    }
}

/// `floor <= quantity / threshold < 1`, compared without dividing.
fn is_near(quantity: u32, threshold: u32, floor: Decimal) -> bool {
    quantity < threshold && Decimal::from(quantity) >= floor * Decimal::from(threshold)
}

fn multiply<'a>(
    price: &Money<'a, Currency>,
    quantity: u32,
) -> Result<Money<'a, Currency>, PricingError> {
    let minor = price
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or(PricingError::Overflow)?;

    Ok(Money::from_minor(minor, price.currency()))
}

fn sum<'a>(
    cart: &Cart<'a>,
    mut line: impl FnMut(&LineItem<'a>) -> Result<Money<'a, Currency>, PricingError>,
) -> Result<Money<'a, Currency>, PricingError> {
    cart.iter()
        .try_fold(Money::from_minor(0, cart.currency()), |acc, item| {
            Ok(acc.add(line(item)?)?)
        })
}
