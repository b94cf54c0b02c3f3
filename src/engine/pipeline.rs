//! Fee and liquidity stages shared by purchases and sales.

use num_bigint::BigUint;
use num_traits::Zero;
use rust_decimal::Decimal;
use tracing::trace;

use crate::engine::pool::add_to_pool;
use crate::types::number::mul_floor;

/// State after the fee and liquidity stages, ready for the swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Staged {
    /// `floor(amount * fee_rate)`
    pub fee: BigUint,
    /// `floor((amount - fee) * liquidity_portion)`
    pub liquidity: BigUint,
    /// What is left for the swap
    pub swap_amount: BigUint,
    /// Pools after both rebalances
    pub pool: Vec<BigUint>,
    /// Leftovers of the liquidity rebalance, fed into the swap
    pub returned: Vec<BigUint>,
}

/// Run the fee and liquidity stages over `pools`.
///
/// The fee is rebalanced into the pool and its leftovers stay with the
/// protocol. The liquidity leftovers are returned for the swap stage.
///
/// # Panics
///
/// Panics if any pool is zero or a rate is negative.
pub(crate) fn stage(
    pools: &[BigUint],
    amount: &BigUint,
    fee_rate: Decimal,
    liquidity_portion: Decimal,
) -> Staged {
    assert!(
        pools.iter().all(|p| !p.is_zero()),
        "simulating against a market with an empty pool: {pools:?}"
    );

    let fee = mul_floor(amount, fee_rate);
    let after_fee = amount - &fee;
    let after_fee_pool = add_to_pool(pools, &fee).pool;
    trace!(%fee, %after_fee, "fee stage");

    let liquidity = mul_floor(&after_fee, liquidity_portion);
    let swap_amount = after_fee - &liquidity;
    let seeded = add_to_pool(&after_fee_pool, &liquidity);
    trace!(%liquidity, %swap_amount, "liquidity stage");

    Staged {
        fee,
        liquidity,
        swap_amount,
        pool: seeded.pool,
        returned: seeded.returned,
    }
}
