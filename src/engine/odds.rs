//! Implied odds from pool sizes.
//!
//! ## Overview
//!
//! In a constant-product market an outcome becomes more likely as its own
//! pool shrinks. Each outcome is weighted by the product of every *other*
//! pool, and the weights are normalized:
//!
//! ```text
//! weight_i = prod(pool_j, j != i)
//! odds_i   = weight_i / sum(weight_k)
//! ```
//!
//! The computation is exact on big integers; only the final ratio is
//! truncated to 28 decimal places, so the odds sum to one within `N * 1e-28`.
//! An outcome whose odds fall below `1e-28` reads as zero.
//!
//! ## Example
//!
//! ```
//! use amm_preview::engine::odds::odds;
//! use num_bigint::BigUint;
//! use rust_decimal::Decimal;
//!
//! let pools = [BigUint::from(1_000_000u32), BigUint::from(3_000_000u32)];
//! assert_eq!(odds(&pools), vec![Decimal::new(75, 2), Decimal::new(25, 2)]);
//! ```

use num_bigint::BigUint;
use num_traits::Zero;
use rust_decimal::Decimal;

use crate::engine::pool::product;
use crate::types::asset::Coins;
use crate::types::market::{Market, OutcomeId};
use crate::types::number::{pow10, ratio_to_decimal, to_percentage};

/// Implied probability of each outcome, in pool order.
///
/// # Panics
///
/// Panics if there are fewer than two pools or any pool is zero.
pub fn odds(pools: &[BigUint]) -> Vec<Decimal> {
    assert!(pools.len() >= 2, "odds need at least two outcomes, got {}", pools.len());
    assert!(
        pools.iter().all(|p| !p.is_zero()),
        "odds of a market with an empty pool: {pools:?}"
    );

    let weights: Vec<BigUint> = (0..pools.len())
        .map(|i| {
            product(
                pools
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, p)| p),
            )
        })
        .collect();
    let total: BigUint = weights.iter().sum();

    weights.iter().map(|w| ratio_to_decimal(w, &total)).collect()
}

/// [`odds`] over human decimal pool sizes such as `1.5` or `2000`.
///
/// All values are brought to the largest scale among them first, so the
/// integer computation sees every digit.
///
/// # Panics
///
/// Panics if there are fewer than two values or any value is not positive.
pub fn odds_from_values(values: &[Decimal]) -> Vec<Decimal> {
    assert!(
        values.iter().all(|v| v.is_sign_positive() && !v.is_zero()),
        "odds of non-positive pool sizes {values:?}"
    );
    let scale = values.iter().map(Decimal::scale).max().unwrap_or(0);

    let pools: Vec<BigUint> = values
        .iter()
        .map(|v| BigUint::from(v.mantissa().unsigned_abs()) * pow10(scale - v.scale()))
        .collect();
    odds(&pools)
}

/// Odds of one outcome, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeOdds {
    pub outcome: OutcomeId,
    /// Probability in `(0, 1)`
    pub probability: Decimal,
    /// `probability * 100`
    pub percentage: Decimal,
    /// Collateral one share costs at these odds
    pub price: Coins,
}

impl Market {
    /// Current odds of every outcome, in id order.
    pub fn outcome_odds(&self) -> Vec<OutcomeOdds> {
        self.outcomes()
            .iter()
            .zip(odds(&self.pool_sizes()))
            .map(|(outcome, probability)| OutcomeOdds {
                outcome: outcome.id,
                probability,
                percentage: to_percentage(probability),
                price: Coins::from_value(self.collateral().clone(), probability),
            })
            .collect()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::types::market::MarketParams;
    use num_bigint::BigInt;
    use rust_decimal_macros::dec;

    fn pools(values: &[u64]) -> Vec<BigUint> {
        values.iter().map(|v| BigUint::from(*v)).collect()
    }

    #[test]
    fn test_two_outcomes() {
        assert_eq!(odds(&pools(&[1_000_000, 3_000_000])), vec![dec!(0.75), dec!(0.25)]);
    }

    #[test]
    fn test_equal_pools() {
        let third = dec!(0.3333333333333333333333333333);
        assert_eq!(odds(&pools(&[7, 7, 7])), vec![third, third, third]);
    }

    #[test]
    fn test_smaller_pool_is_likelier() {
        let o = odds(&pools(&[100, 200, 400]));
        // weights 80_000, 40_000, 20_000
        assert_eq!(o[0], dec!(0.5714285714285714285714285714));
        assert!(o[0] > o[1] && o[1] > o[2]);
    }

    #[test]
    fn test_skewed_pools_keep_small_odds() {
        let pools = [pow10(24), BigUint::from(100_000u32)];
        let o = odds(&pools);
        assert_eq!(o[0], dec!(0.0000000000000000000999999999));
        assert_eq!(o[1], dec!(0.9999999999999999999000000000));
        assert!(o.iter().all(|p| *p > Decimal::ZERO));
    }

    #[test]
    fn test_from_values_rescales() {
        assert_eq!(odds_from_values(&[dec!(1), dec!(3.0)]), vec![dec!(0.75), dec!(0.25)]);
        assert_eq!(odds_from_values(&[dec!(0.5), dec!(1.5)]), vec![dec!(0.75), dec!(0.25)]);
    }

    #[test]
    #[should_panic(expected = "at least two outcomes")]
    fn test_single_pool_panics() {
        odds(&pools(&[5]));
    }

    #[test]
    #[should_panic(expected = "empty pool")]
    fn test_zero_pool_panics() {
        odds(&pools(&[5, 0]));
    }

    #[test]
    #[should_panic(expected = "non-positive")]
    fn test_negative_value_panics() {
        odds_from_values(&[dec!(1), dec!(-1)]);
    }

    #[test]
    fn test_outcome_odds() {
        let config = EngineConfig::default().with_coin("untrn", "NTRN", 6);
        let params = MarketParams {
            denom: "untrn".into(),
            ..MarketParams::default().with_pools([1_000_000u32, 3_000_000])
        };
        let market = Market::new(params, &config).unwrap();

        let odds = market.outcome_odds();
        assert_eq!(odds[0].outcome, OutcomeId(0));
        assert_eq!(odds[0].percentage, dec!(75));
        assert_eq!(odds[1].price.units(), &BigInt::from(250_000));
        assert_eq!(odds[1].price.to_format(true), "0.25000 NTRN");
    }
}
