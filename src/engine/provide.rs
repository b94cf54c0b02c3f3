//! Liquidity provision preview.
//!
//! Providing liquidity pays no fee. The whole deposit is absorbed with
//! [`add_to_pool`]; the provider is minted LP shares in proportion to the
//! largest pool and keeps the per-outcome shares the pool could not absorb.

use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use rust_decimal::Decimal;
use tracing::debug;

use crate::engine::pool::add_to_pool;
use crate::types::asset::{Coins, Shares};
use crate::types::market::Market;
use crate::types::number::{ratio_to_decimal, to_percentage};

/// Preview of a liquidity deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvideResult {
    /// LP shares minted: `floor(amount * lp_shares / max(pool))`
    pub lp_shares: BigUint,
    /// Outcome shares handed back to the provider, by outcome id
    pub returned: Vec<Shares>,
    /// Outcome shares added to each pool, by outcome id
    pub added: Vec<Shares>,
    /// Percentage of the pool the minted LP shares own after the deposit
    pub pool_portion: Decimal,
}

/// Preview providing `amount` of collateral as liquidity.
///
/// # Panics
///
/// Panics if `amount` is negative or in a different collateral.
pub fn simulate_provide(market: &Market, amount: &Coins) -> ProvideResult {
    assert!(!amount.is_negative(), "negative liquidity amount {amount}");
    assert_eq!(
        amount.denom(),
        market.denom(),
        "liquidity provided in a foreign collateral"
    );

    let pools = market.pool_sizes();
    let units = amount.units().magnitude();
    let rebalance = add_to_pool(&pools, units);

    // add_to_pool already rejected empty and all-zero pools
    let weight = pools.iter().max().cloned().unwrap_or_default();
    let lp_shares = units * market.lp_shares() / weight;

    let total = market.lp_shares() + &lp_shares;
    let pool_portion = if total.is_zero() {
        Decimal::ZERO
    } else {
        to_percentage(ratio_to_decimal(&lp_shares, &total))
    };

    let to_shares = |values: Vec<BigUint>| -> Vec<Shares> {
        values
            .into_iter()
            .map(|v| Shares::from_units(market.share_kind().clone(), BigInt::from(v)))
            .collect()
    };

    debug!(
        market = %market.id(),
        amount = %units,
        lp_shares = %lp_shares,
        pool_portion = %pool_portion,
        "simulated liquidity provision"
    );

    ProvideResult {
        lp_shares,
        returned: to_shares(rebalance.returned),
        added: to_shares(rebalance.added),
        pool_portion,
    }
}
