//! Proportional pool rebalancing.
//!
//! ## Overview
//!
//! Every stage that puts collateral into a market (fee, liquidity seeding,
//! liquidity provision) absorbs it the same way: each outcome pool grows in
//! proportion to its size relative to the *largest* pool, so the ratios
//! between pools, and with them the odds, do not move. Whatever an outcome
//! could not absorb is handed back as that outcome's `returned` leftover.
//!
//! For every outcome `i`:
//!
//! ```text
//! added_i    = floor(amount * pool_i / max(pool))
//! returned_i = amount - added_i
//! ```
//!
//! The largest pool absorbs the whole amount and returns nothing.
//!
//! ## Example
//!
//! ```
//! use amm_preview::engine::pool::add_to_pool;
//! use num_bigint::BigUint;
//!
//! let pools = [BigUint::from(1_000u32), BigUint::from(3_000u32)];
//! let rebalance = add_to_pool(&pools, &BigUint::from(300u32));
//!
//! assert_eq!(rebalance.pool, vec![BigUint::from(1_100u32), BigUint::from(3_300u32)]);
//! assert_eq!(rebalance.returned, vec![BigUint::from(200u32), BigUint::from(0u32)]);
//! ```

use num_bigint::BigUint;
use num_traits::Zero;

/// Outcome of [`add_to_pool`]. All vectors are indexed by outcome id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolRebalance {
    /// Pool sizes after absorbing the amount
    pub pool: Vec<BigUint>,
    /// Portion of the amount each outcome absorbed
    pub added: Vec<BigUint>,
    /// Portion of the amount each outcome could not absorb
    pub returned: Vec<BigUint>,
}

impl PoolRebalance {
    /// Total absorbed across all outcomes
    pub fn total_added(&self) -> BigUint {
        self.added.iter().sum()
    }
}

/// Absorb `amount` into `pool_before` proportionally to the largest pool.
///
/// # Arguments
///
/// * `pool_before` - Current pool size per outcome, all strictly positive
/// * `amount` - Base units to absorb
///
/// # Returns
///
/// New pools plus the per-outcome added and returned amounts, where
/// `added_i + returned_i == amount` for every outcome.
///
/// # Panics
///
/// Panics if `pool_before` is empty or its largest pool is zero.
pub fn add_to_pool(pool_before: &[BigUint], amount: &BigUint) -> PoolRebalance {
    let weight = pool_before
        .iter()
        .max()
        .unwrap_or_else(|| panic!("rebalancing a market without outcomes"));
    assert!(!weight.is_zero(), "rebalancing empty pools {pool_before:?}");

    let count = pool_before.len();
    let mut rebalance = PoolRebalance {
        pool: Vec::with_capacity(count),
        added: Vec::with_capacity(count),
        returned: Vec::with_capacity(count),
    };

    for pool in pool_before {
        let added = amount * pool / weight;
        rebalance.pool.push(pool + &added);
        rebalance.returned.push(amount - &added);
        rebalance.added.push(added);
    }

    rebalance
}

/// Product of all pools.
pub(crate) fn product<'a, I>(pools: I) -> BigUint
where
    I: IntoIterator<Item = &'a BigUint>,
{
    pools.into_iter().product()
}

// ============================================================================
// Unit Tests
// ============================================================================
