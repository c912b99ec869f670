//! Price Tiers
//!
//! Volume discount tiers. Each tier unlocks a fixed unit price once the quantity on a line
//! reaches its threshold. A product may carry any number of tiers; the storefront's
//! "special" and "super wholesale" prices are simply the two-tier case.

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

/// Errors raised while building price tiers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TierError {
    /// A tier threshold of zero would always be met.
    #[error("tier threshold must be at least 1 unit")]
    ZeroThreshold,

    /// Two tiers share the same quantity threshold.
    #[error("duplicate tier threshold: {0}")]
    DuplicateThreshold(u32),

    /// A tier price is in a different currency (tier currency, expected currency).
    #[error("tier has currency {0}, expected {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Only one of a tier's price and quantity was supplied.
    #[error("{0} tier needs both a price and a quantity")]
    IncompleteTier(String),
}

/// A single volume discount tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceTier<'a> {
    threshold: u32,
    price: Money<'a, Currency>,
}

impl<'a> PriceTier<'a> {
    /// Create a tier that unlocks `price` per unit from `threshold` units upwards.
    ///
    /// # Errors
    ///
    /// Returns [`TierError::ZeroThreshold`] if `threshold` is zero.
    pub fn new(threshold: u32, price: Money<'a, Currency>) -> Result<Self, TierError> {
        if threshold == 0 {
            return Err(TierError::ZeroThreshold);
        }

        Ok(Self { threshold, price })
    }

    /// Build an optional tier from separately stored price and quantity fields.
    ///
    /// Both halves absent yields `Ok(None)`; both present yields the tier.
    ///
    /// # Errors
    ///
    /// - [`TierError::IncompleteTier`]: exactly one of `price` / `quantity` was given.
    /// - [`TierError::ZeroThreshold`]: the quantity is zero.
    pub fn from_parts(
        name: &str,
        price: Option<Money<'a, Currency>>,
        quantity: Option<u32>,
    ) -> Result<Option<Self>, TierError> {
        match (price, quantity) {
            (None, None) => Ok(None),
            (Some(price), Some(quantity)) => Self::new(quantity, price).map(Some),
            _ => Err(TierError::IncompleteTier(name.to_string())),
        }
    }

    /// Quantity at which the tier unlocks.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Unit price once unlocked.
    pub fn price(&self) -> &Money<'a, Currency> {
        &self.price
    }

    /// Whether `quantity` units unlock this tier.
    pub fn is_met(&self, quantity: u32) -> bool {
        quantity >= self.threshold
    }
}

/// Tiers for one product, sorted ascending by threshold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTiers<'a> {
    tiers: SmallVec<[PriceTier<'a>; 2]>,
}

impl<'a> PriceTiers<'a> {
    /// No tiers: the base price always applies.
    pub fn none() -> Self {
        Self::default()
    }

    /// Build a tier set from tiers in any order.
    ///
    /// # Errors
    ///
    /// - [`TierError::DuplicateThreshold`]: two tiers share a threshold.
    /// - [`TierError::CurrencyMismatch`]: tier prices are not all in one currency.
    pub fn new(tiers: impl IntoIterator<Item = PriceTier<'a>>) -> Result<Self, TierError> {
        let mut tiers: SmallVec<[PriceTier<'a>; 2]> = tiers.into_iter().collect();

        tiers.sort_by_key(PriceTier::threshold);

        for pair in tiers.windows(2) {
            if let [a, b] = pair {
                if a.threshold == b.threshold {
                    return Err(TierError::DuplicateThreshold(a.threshold));
                }

                if a.price.currency() != b.price.currency() {
                    return Err(TierError::CurrencyMismatch(
                        b.price.currency().iso_alpha_code,
                        a.price.currency().iso_alpha_code,
                    ));
                }
            }
        }

        Ok(Self { tiers })
    }

    /// Build a tier set from the storefront's two named tiers.
    ///
    /// # Errors
    ///
    /// See [`PriceTiers::new`].
    pub fn from_legacy(
        special: Option<PriceTier<'a>>,
        super_wholesale: Option<PriceTier<'a>>,
    ) -> Result<Self, TierError> {
        Self::new(special.into_iter().chain(super_wholesale))
    }

    /// Verify every tier is priced in `currency`.
    ///
    /// # Errors
    ///
    /// Returns [`TierError::CurrencyMismatch`] for the first tier in another currency.
    pub fn ensure_currency(&self, currency: &Currency) -> Result<(), TierError> {
        match self.tiers.iter().find(|tier| tier.price.currency() != currency) {
            Some(tier) => Err(TierError::CurrencyMismatch(
                tier.price.currency().iso_alpha_code,
                currency.iso_alpha_code,
            )),
            None => Ok(()),
        }
    }

    /// The cheapest tier unlocked at `quantity`, if any.
    ///
    /// When several tiers are met the lowest price wins regardless of threshold order;
    /// equal prices resolve to the lower threshold.
    pub fn best_met(&self, quantity: u32) -> Option<&PriceTier<'a>> {
        self.tiers
            .iter()
            .filter(|tier| tier.is_met(quantity))
            .min_by_key(|tier| tier.price.to_minor_units())
    }

    /// The lowest-threshold tier still locked at `quantity` that would undercut the price
    /// currently paid: the best met tier, or `base_price` when none is met.
    pub fn next_upgrade(
        &self,
        quantity: u32,
        base_price: &Money<'a, Currency>,
    ) -> Option<&PriceTier<'a>> {
        let current = self
            .best_met(quantity)
            .map_or(base_price, PriceTier::price)
            .to_minor_units();

        self.tiers
            .iter()
            .find(|tier| !tier.is_met(quantity) && tier.price.to_minor_units() < current)
    }

    /// Iterate tiers in ascending threshold order.
    pub fn iter(&self) -> impl Iterator<Item = &PriceTier<'a>> {
        self.tiers.iter()
    }

    /// Number of tiers.
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// True when no tiers are defined.
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;

    fn tier(threshold: u32, minor: i64) -> Result<PriceTier<'static>, TierError> {
        PriceTier::new(threshold, Money::from_minor(minor, GBP))
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let result = PriceTier::new(0, Money::from_minor(100, GBP));

        assert_eq!(result, Err(TierError::ZeroThreshold));
    }

    #[test]
    fn from_parts_requires_both_halves() -> TestResult {
        let price = Money::from_minor(2000, GBP);

        assert_eq!(PriceTier::from_parts("special", None, None)?, None);
        assert_eq!(
            PriceTier::from_parts("special", Some(price), None),
            Err(TierError::IncompleteTier("special".to_string()))
        );
        assert_eq!(
            PriceTier::from_parts("special", None, Some(20)),
            Err(TierError::IncompleteTier("special".to_string()))
        );
        assert_eq!(
            PriceTier::from_parts("special", Some(price), Some(20))?,
            Some(tier(20, 2000)?)
        );

        Ok(())
    }

    #[test]
    fn tiers_are_sorted_by_threshold() -> TestResult {
        let tiers = PriceTiers::new([tier(50, 1000)?, tier(10, 2000)?, tier(25, 1500)?])?;

        let thresholds: Vec<u32> = tiers.iter().map(PriceTier::threshold).collect();

        assert_eq!(thresholds, vec![10, 25, 50]);

        Ok(())
    }

    #[test]
    fn duplicate_thresholds_are_rejected() -> TestResult {
        let result = PriceTiers::new([tier(10, 1000)?, tier(10, 900)?]);

        assert_eq!(result, Err(TierError::DuplicateThreshold(10)));

        Ok(())
    }

    #[test]
    fn mixed_currencies_are_rejected() -> TestResult {
        let usd = PriceTier::new(20, Money::from_minor(900, USD))?;
        let result = PriceTiers::new([tier(10, 1000)?, usd]);

        assert_eq!(result, Err(TierError::CurrencyMismatch("USD", "GBP")));

        Ok(())
    }

    #[test]
    fn best_met_picks_cheapest_unlocked_tier() -> TestResult {
        // The higher threshold is deliberately the dearer tier.
        let tiers = PriceTiers::from_legacy(Some(tier(20, 2000)?), Some(tier(15, 1500)?))?;

        assert_eq!(tiers.best_met(14), None);
        assert_eq!(tiers.best_met(15), Some(&tier(15, 1500)?));
        assert_eq!(tiers.best_met(40), Some(&tier(15, 1500)?));

        Ok(())
    }

    #[test]
    fn best_met_is_none_for_zero_quantity() -> TestResult {
        let tiers = PriceTiers::new([tier(1, 500)?])?;

        assert_eq!(tiers.best_met(0), None);
        assert_eq!(tiers.best_met(1), Some(&tier(1, 500)?));

        Ok(())
    }

    #[test]
    fn next_upgrade_walks_up_the_tiers() -> TestResult {
        let base = Money::from_minor(1000, GBP);
        let tiers = PriceTiers::new([tier(10, 900)?, tier(30, 700)?])?;

        assert_eq!(tiers.next_upgrade(5, &base).map(PriceTier::threshold), Some(10));
        assert_eq!(tiers.next_upgrade(10, &base).map(PriceTier::threshold), Some(30));
        assert_eq!(tiers.next_upgrade(30, &base), None);

        Ok(())
    }

    #[test]
    fn next_upgrade_skips_tiers_that_cost_more() -> TestResult {
        let base = Money::from_minor(2500, GBP);

        // At 15 units the 15+ tier already beats the 20+ tier.
        let tiers = PriceTiers::from_legacy(Some(tier(20, 2000)?), Some(tier(15, 1500)?))?;
        let above_base = PriceTiers::new([tier(10, 3000)?])?;

        assert_eq!(tiers.next_upgrade(10, &base).map(PriceTier::threshold), Some(15));
        assert_eq!(tiers.next_upgrade(15, &base), None);
        assert_eq!(above_base.next_upgrade(1, &base), None);

        Ok(())
    }

    #[test]
    fn ensure_currency_reports_first_mismatch() -> TestResult {
        let tiers = PriceTiers::new([tier(10, 900)?])?;

        assert_eq!(tiers.ensure_currency(GBP), Ok(()));
        assert_eq!(
            tiers.ensure_currency(USD),
            Err(TierError::CurrencyMismatch("GBP", "USD"))
        );

        Ok(())
    }
}
