//! Sale simulator: outcome shares in, collateral out.
//!
//! ## Pipeline
//!
//! The mirror of [`crate::engine::purchase`], with shares as the input and
//! the withdrawal fee in place of the deposit fee:
//!
//! 1. **Fee**: `floor(shares * withdrawal_fee)` is rebalanced into the pool.
//! 2. **Liquidity**: `floor((shares - fee) * liquidity_portion)` is seeded
//!    into the pool; its per-outcome leftovers carry over.
//! 3. **Swap**: the remaining shares go into the selected pool and the
//!    leftovers into every pool. The seller then receives `c` collateral by
//!    burning `c` complete sets, where `c` is the largest amount that keeps
//!    the product of all pools at or above its value before the additions.
//!
//! ```text
//! invariant = prod(pool_i)                                  (before additions)
//! q_i       = pool_i + returned_i (+ swap_amount if i == selected)
//! coins     = max { c : prod(q_i - c) >= invariant }
//! ```
//!
//! Fees and liquidity of a sale are denominated in shares.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};
use rust_decimal::Decimal;
use tracing::debug;

use crate::engine::pipeline::stage;
use crate::engine::pool::product;
use crate::types::asset::{Coins, Shares};
use crate::types::market::{Market, OutcomeId};

/// Preview of a withdrawal from one outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleResult {
    /// Collateral the seller receives
    pub coins: Coins,
    /// Shares seeded into the pool as liquidity
    pub liquidity: Shares,
    /// Withdrawal fee, in shares
    pub fees: Shares,
    /// Collateral received per whole share sold; `None` when nothing was sold
    pub price: Option<Coins>,
}

/// Base-unit breakdown of a sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleUnits {
    pub coins: BigUint,
    pub liquidity: BigUint,
    pub fee: BigUint,
}

/// Largest `c <= min(q)` with `prod(q_i - c) >= invariant`.
///
/// The product shrinks as `c` grows, so a binary search finds the boundary.
/// Callers guarantee `prod(q) >= invariant`, which makes `c = 0` feasible.
fn burnable_sets(q: &[BigUint], invariant: &BigUint) -> BigUint {
    let feasible = |c: &BigUint| q.iter().map(|x| x - c).product::<BigUint>() >= *invariant;

    let mut lo = BigUint::zero();
    let mut hi = q.iter().min().cloned().unwrap_or_default();
    while lo < hi {
        let mid = (&lo + &hi + BigUint::one()) >> 1u32;
        if feasible(&mid) {
            lo = mid;
        } else {
            hi = mid - BigUint::one();
        }
    }
    lo
}

/// Run the sale pipeline on raw pool sizes.
///
/// # Arguments
///
/// * `pools` - Pool size per outcome, all strictly positive
/// * `selected` - Index of the outcome being sold
/// * `shares` - Shares surrendered, in base units
/// * `fee_rate` - Withdrawal fee in `[0, 1)`
/// * `liquidity_portion` - Fraction of the post-fee shares seeded as liquidity
///
/// # Panics
///
/// Panics if `selected` is out of range or a pool is zero.
pub fn sale_units(
    pools: &[BigUint],
    selected: usize,
    shares: &BigUint,
    fee_rate: Decimal,
    liquidity_portion: Decimal,
) -> SaleUnits {
    assert!(
        selected < pools.len(),
        "outcome {selected} out of range for {} pools",
        pools.len()
    );

    let staged = stage(pools, shares, fee_rate, liquidity_portion);

    let invariant = product(&staged.pool);
    let mut q: Vec<BigUint> = staged
        .pool
        .iter()
        .zip(&staged.returned)
        .map(|(pool, returned)| pool + returned)
        .collect();
    q[selected] += &staged.swap_amount;

    SaleUnits {
        coins: burnable_sets(&q, &invariant),
        liquidity: staged.liquidity,
        fee: staged.fee,
    }
}

/// Preview selling `shares` of `outcome` back to the market.
///
/// # Panics
///
/// Panics if `outcome` is not in the market, `shares` is negative, or the
/// shares belong to a different market collateral.
///
/// # Example
///
/// ```
/// use amm_preview::config::EngineConfig;
/// use amm_preview::engine::simulate_sale;
/// use amm_preview::types::{Market, MarketParams, OutcomeId};
/// use rust_decimal::Decimal;
///
/// let config = EngineConfig::default().with_liquidity_portion(Decimal::ZERO);
/// let params = MarketParams::default().with_pools([1_000_000u32, 1_000_000]);
/// let market = Market::new(params, &config).unwrap();
///
/// let shares = market.parse_shares("190910").unwrap();
/// let result = simulate_sale(&market, OutcomeId(0), &shares);
/// assert_eq!(result.coins.units().to_string(), "90909");
/// ```
pub fn simulate_sale(market: &Market, outcome: OutcomeId, shares: &Shares) -> SaleResult {
    let selected = market.outcome(outcome);
    assert!(!shares.is_negative(), "negative sale amount {shares}");
    assert_eq!(
        shares.kind().denom(),
        market.denom(),
        "selling shares of a foreign collateral"
    );

    let units = sale_units(
        &market.pool_sizes(),
        outcome.index(),
        shares.units().magnitude(),
        market.withdrawal_fee(),
        market.liquidity_portion(),
    );

    let share_kind = market.share_kind().clone();
    let coins = Coins::from_units(market.collateral().clone(), BigInt::from(units.coins));
    let price = coins.per_share(shares);

    debug!(
        market = %market.id(),
        outcome = %selected.label,
        shares = %shares.units(),
        fee = %units.fee,
        liquidity = %units.liquidity,
        coins = %coins.units(),
        "simulated sale"
    );

    SaleResult {
        coins,
        liquidity: Shares::from_units(share_kind.clone(), BigInt::from(units.liquidity)),
        fees: Shares::from_units(share_kind, BigInt::from(units.fee)),
        price,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
