//! Purchase simulator: collateral in, outcome shares out.
//!
//! ## Pipeline
//!
//! 1. **Fee**: `floor(amount * deposit_fee)` is rebalanced into the pool.
//! 2. **Liquidity**: `floor((amount - fee) * liquidity_portion)` is seeded
//!    into the pool; its per-outcome leftovers carry over.
//! 3. **Swap**: the rest mints a complete set of outcome shares that is
//!    added to every pool together with the leftovers. The selected pool is
//!    then shrunk until the product of all pools is back to its value before
//!    the additions, and the difference is paid out to the buyer.
//!
//! ```text
//! invariant      = prod(pool_i)                    (before additions)
//! pool_i        += swap_amount + returned_i
//! selected_after = floor(invariant / prod(pool_j, j != selected))
//! shares         = pool[selected] - selected_after
//! ```
//!
//! ## Example
//!
//! ```
//! use amm_preview::config::EngineConfig;
//! use amm_preview::engine::simulate_purchase;
//! use amm_preview::types::{Market, MarketParams, OutcomeId};
//! use rust_decimal::Decimal;
//!
//! let config = EngineConfig::default().with_liquidity_portion(Decimal::ZERO);
//! let params = MarketParams::default().with_pools([1_000_000u32, 1_000_000]);
//! let market = Market::new(params, &config).unwrap();
//!
//! let amount = market.parse_coins("100000").unwrap();
//! let result = simulate_purchase(&market, OutcomeId(0), &amount);
//! assert_eq!(result.shares.units().to_string(), "190910");
//! ```

use num_bigint::{BigInt, BigUint};
use num_traits::Signed;
use rust_decimal::Decimal;
use tracing::debug;

use crate::engine::pipeline::stage;
use crate::engine::pool::product;
use crate::types::asset::{Coins, Shares};
use crate::types::market::{Market, OutcomeId};

/// Preview of a deposit on one outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseResult {
    /// Outcome shares the buyer receives
    pub shares: Shares,
    /// Collateral seeded into the pool as liquidity
    pub liquidity: Coins,
    /// Deposit fee
    pub fees: Coins,
    /// Collateral paid per whole share; `None` when no shares were bought
    pub price: Option<Coins>,
}

/// Base-unit breakdown of a purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseUnits {
    pub shares: BigUint,
    pub liquidity: BigUint,
    pub fee: BigUint,
}

/// Run the purchase pipeline on raw pool sizes.
///
/// # Arguments
///
/// * `pools` - Pool size per outcome, all strictly positive
/// * `selected` - Index of the outcome being bought
/// * `amount` - Collateral deposited, in base units
/// * `fee_rate` - Deposit fee in `[0, 1)`
/// * `liquidity_portion` - Fraction of the post-fee amount seeded as liquidity
///
/// # Panics
///
/// Panics if `selected` is out of range, a pool is zero, or the swap would
/// yield a negative number of shares.
pub fn purchase_units(
    pools: &[BigUint],
    selected: usize,
    amount: &BigUint,
    fee_rate: Decimal,
    liquidity_portion: Decimal,
) -> PurchaseUnits {
    assert!(
        selected < pools.len(),
        "outcome {selected} out of range for {} pools",
        pools.len()
    );

    let staged = stage(pools, amount, fee_rate, liquidity_portion);

    let invariant = product(&staged.pool);
    let pool: Vec<BigUint> = staged
        .pool
        .iter()
        .zip(&staged.returned)
        .map(|(pool, returned)| pool + &staged.swap_amount + returned)
        .collect();

    let product_others = product(
        pool.iter()
            .enumerate()
            .filter(|(i, _)| *i != selected)
            .map(|(_, p)| p),
    );
    let selected_after = invariant / product_others;

    let selected_pool = &pool[selected];
    assert!(
        &selected_after <= selected_pool,
        "purchase of outcome {selected} produced negative shares: \
         pool {selected_pool}, after swap {selected_after}"
    );
    let shares = selected_pool - selected_after;

    PurchaseUnits {
        shares,
        liquidity: staged.liquidity,
        fee: staged.fee,
    }
}

/// Preview buying `outcome` with `amount` of the market's collateral.
///
/// # Panics
///
/// Panics if `outcome` is not in the market, `amount` is negative, or
/// `amount` is denominated in a different collateral.
///
/// # Example
///
/// ```
/// use amm_preview::config::EngineConfig;
/// use amm_preview::engine::simulate_purchase;
/// use amm_preview::types::{Market, MarketParams, OutcomeId};
///
/// let params = MarketParams::default().with_pools([500_000u32, 500_000]);
/// let market = Market::new(params, &EngineConfig::default()).unwrap();
///
/// let nothing = market.parse_coins("0").unwrap();
/// let result = simulate_purchase(&market, OutcomeId(1), &nothing);
/// assert!(result.shares.is_zero());
/// assert!(result.price.is_none());
/// ```
pub fn simulate_purchase(market: &Market, outcome: OutcomeId, amount: &Coins) -> PurchaseResult {
    let selected = market.outcome(outcome);
    assert!(!amount.is_negative(), "negative purchase amount {amount}");
    assert_eq!(
        amount.denom(),
        market.denom(),
        "purchase paid in a foreign collateral"
    );

    let units = purchase_units(
        &market.pool_sizes(),
        outcome.index(),
        amount.units().magnitude(),
        market.deposit_fee(),
        market.liquidity_portion(),
    );

    let collateral = market.collateral().clone();
    let shares = Shares::from_units(market.share_kind().clone(), BigInt::from(units.shares));
    let price = amount.per_share(&shares);

    debug!(
        market = %market.id(),
        outcome = %selected.label,
        amount = %amount.units(),
        fee = %units.fee,
        liquidity = %units.liquidity,
        shares = %shares.units(),
        "simulated purchase"
    );
    debug_assert!(!shares.units().is_negative());

    PurchaseResult {
        shares,
        liquidity: Coins::from_units(collateral.clone(), BigInt::from(units.liquidity)),
        fees: Coins::from_units(collateral, BigInt::from(units.fee)),
        price,
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
    use rust_decimal_macros::dec;

    fn pools(values: &[u64]) -> Vec<BigUint> {
        values.iter().map(|v| BigUint::from(*v)).collect()
    }

    fn market(pools: [u64; 2], deposit_fee: Decimal, liquidity_portion: Decimal) -> Market {
        let config = EngineConfig::default()
            .with_coin("untrn", "NTRN", 6)
            .with_liquidity_portion(liquidity_portion);
        let params = MarketParams {
            denom: "untrn".into(),
            deposit_fee,
            ..MarketParams::default().with_pools(pools)
        };
        Market::new(params, &config).unwrap()
    }

    #[test]
    fn test_constant_product_swap() {
        let pools = pools(&[1_000_000, 1_000_000]);
        let amount = BigUint::from(100_000u32);
        let units = purchase_units(&pools, 0, &amount, Decimal::ZERO, Decimal::ZERO);
        // floor(10^12 / 1_100_000) = 909_090
        assert_eq!(units.shares, BigUint::from(190_910u32));
        assert_eq!(units.fee, BigUint::from(0u8));
        assert_eq!(units.liquidity, BigUint::from(0u8));
    }

    #[test]
    fn test_fee_is_floor_of_rate() {
        let m = market([1_000_000, 1_000_000], dec!(0.02), dec!(0.1));
        let amount = Coins::from_units(m.collateral().clone(), 1_000_000);
        let result = simulate_purchase(&m, OutcomeId(0), &amount);
        assert_eq!(result.fees.units(), &BigInt::from(20_000));
        assert_eq!(result.liquidity.units(), &BigInt::from(98_000));
    }

    #[test]
    fn test_zero_amount() {
        let m = market([500_000, 500_000], dec!(0.01), dec!(0.1));
        let result = simulate_purchase(&m, OutcomeId(0), &Coins::zero(m.collateral().clone()));
        assert!(result.shares.is_zero());
        assert!(result.fees.is_zero());
        assert!(result.liquidity.is_zero());
        assert_eq!(result.price, None);
    }

    #[test]
    fn test_price_is_amount_per_share() {
        let m = market([1_000_000, 1_000_000], Decimal::ZERO, Decimal::ZERO);
        let amount = Coins::from_units(m.collateral().clone(), 100_000);
        let result = simulate_purchase(&m, OutcomeId(0), &amount);
        assert_eq!(result.shares.units(), &BigInt::from(190_910));
        assert_eq!(result.price.unwrap().units(), &BigInt::from(523_807));
    }

    #[test]
    fn test_underdog_is_cheaper() {
        // outcome 1 has the larger pool, so it is the less likely one
        let m = market([1_000_000, 3_000_000], Decimal::ZERO, dec!(0.1));
        let amount = Coins::from_units(m.collateral().clone(), 50_000);
        let favourite = simulate_purchase(&m, OutcomeId(0), &amount);
        let underdog = simulate_purchase(&m, OutcomeId(1), &amount);
        assert!(underdog.shares > favourite.shares);
    }

    #[test]
    fn test_shares_exceed_amount_below_certainty() {
        let m = market([1_000_000, 1_000_000], dec!(0.01), dec!(0.1));
        let amount = Coins::from_units(m.collateral().clone(), 10_000);
        let result = simulate_purchase(&m, OutcomeId(1), &amount);
        assert!(result.shares.units() > amount.units());
    }

    #[test]
    fn test_three_outcomes() {
        let pools = pools(&[1_000, 2_000, 4_000]);
        let amount = BigUint::from(700u32);
        let units = purchase_units(&pools, 2, &amount, Decimal::ZERO, Decimal::ZERO);
        // invariant 8e9, others (1700 * 2700) = 4_590_000, after = 1742
        assert_eq!(units.shares, BigUint::from(4_700u32 - 1_742));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_invalid_outcome_panics() {
        let m = market([1, 1], Decimal::ZERO, Decimal::ZERO);
        simulate_purchase(&m, OutcomeId(2), &Coins::zero(m.collateral().clone()));
    }

    #[test]
    #[should_panic(expected = "negative purchase amount")]
    fn test_negative_amount_panics() {
        let m = market([1, 1], Decimal::ZERO, Decimal::ZERO);
        simulate_purchase(&m, OutcomeId(0), &Coins::from_units(m.collateral().clone(), -1));
    }

    #[test]
    #[should_panic(expected = "empty pool")]
    fn test_zero_pool_panics() {
        purchase_units(&pools(&[0, 10]), 0, &BigUint::from(5u8), Decimal::ZERO, Decimal::ZERO);
    }
}
