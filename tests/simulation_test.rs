//! Property tests for the simulation engine.
//!
//! These tests verify, over seeded random markets:
//! 1. Pool rebalancing conserves every absorbed unit
//! 2. Larger trades never yield less
//! 3. Results are never negative
//! 4. Odds sum to one
//!
//! ## Running
//!
//! ```bash
//! cargo test --release --test simulation_test -- --nocapture
//! ```

use num_bigint::{BigInt, BigUint};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use amm_preview::engine::{
    add_to_pool, odds, odds_from_values, purchase_units, sale_units, simulate_provide,
};
use amm_preview::types::{Coins, MarketParams, Shares};
use amm_preview::{simulate_purchase, simulate_sale, EngineConfig, Market, OutcomeId};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

/// Random markets generated per property
const CASES: usize = 500;

/// Step between compared trade sizes when fees are charged.
///
/// With a fee, one extra unit can leave the floored fee unchanged and move
/// into the liquidity stage instead, where it shifts the pools against the
/// buyer. Unit steps are only monotonic without fees.
const FEE_STEP: u64 = 10_000;

/// Fee/liquidity settings every property runs under
const RATES: [(Decimal, Decimal); 3] = [
    (Decimal::ZERO, Decimal::ZERO),
    (Decimal::from_parts(1, 0, 0, false, 2), Decimal::from_parts(1, 0, 0, false, 1)),
    (Decimal::from_parts(5, 0, 0, false, 2), Decimal::from_parts(1, 0, 0, false, 1)),
];

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Random pool vector with 2 to 5 outcomes.
fn random_pools(rng: &mut ChaCha8Rng) -> Vec<BigUint> {
    let count = rng.gen_range(2..=5);
    (0..count)
        .map(|_| BigUint::from(rng.gen_range(1_000u64..=1_000_000_000)))
        .collect()
}

fn big(value: u64) -> BigUint {
    BigUint::from(value)
}

const MARKET_JSON: &str = r#"{
    "id": 42,
    "title": "Two-sided market",
    "description": "",
    "outcomes": [
        { "id": 0, "label": "Yes", "pool_tokens": "1000000", "wallets": 0 },
        { "id": 1, "label": "No", "pool_tokens": "1000000", "wallets": 0 }
    ],
    "denom": "untrn",
    "deposit_fee": "0",
    "withdrawal_fee": "0",
    "deposit_stop_date": "0",
    "withdrawal_stop_date": "0",
    "winner": null,
    "total_wallets": 0,
    "pool_size": "2000000",
    "lp_shares": "1000000000000"
}"#;

fn two_sided_market(pools: [u64; 2], fee: Decimal, liquidity_portion: Decimal) -> Market {
    let config = EngineConfig::default().with_liquidity_portion(liquidity_portion);
    let params = MarketParams {
        denom: "untrn".into(),
        deposit_fee: fee,
        withdrawal_fee: fee,
        ..MarketParams::default().with_pools(pools)
    };
    Market::new(params, &config).unwrap()
}

// ============================================================================
// PROPERTIES
// ============================================================================

#[test]
fn rebalance_conserves_amount() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    for _ in 0..CASES {
        let before = random_pools(&mut rng);
        let amount = big(rng.gen_range(0..=1_000_000_000));
        let rebalance = add_to_pool(&before, &amount);

        let sum_before: BigUint = before.iter().sum();
        let sum_after: BigUint = rebalance.pool.iter().sum();
        assert_eq!(&sum_after - &sum_before, rebalance.total_added());

        for i in 0..before.len() {
            assert_eq!(&rebalance.added[i] + &rebalance.returned[i], amount);
            assert!(rebalance.pool[i] >= before[i]);
        }
        // the largest pool absorbs everything
        assert!(rebalance.returned.iter().any(|r| *r == BigUint::from(0u8)));
    }
}

#[test]
fn purchase_is_monotonic() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    for _ in 0..CASES {
        let pools = random_pools(&mut rng);
        let selected = rng.gen_range(0..pools.len());
        let amount = rng.gen_range(0..=1_000_000_000u64);

        // without fees every extra unit counts
        let a = purchase_units(&pools, selected, &big(amount), Decimal::ZERO, Decimal::ZERO);
        let b = purchase_units(&pools, selected, &big(amount + 1), Decimal::ZERO, Decimal::ZERO);
        assert!(b.shares >= a.shares, "{pools:?} outcome {selected} amount {amount}");

        for (fee, liquidity) in RATES {
            let a = purchase_units(&pools, selected, &big(amount), fee, liquidity);
            let b = purchase_units(&pools, selected, &big(amount + FEE_STEP), fee, liquidity);
            assert!(b.shares >= a.shares, "{pools:?} outcome {selected} amount {amount} fee {fee}");
        }
    }
}

#[test]
fn sale_is_monotonic_and_bounded() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    for _ in 0..CASES {
        let pools = random_pools(&mut rng);
        let selected = rng.gen_range(0..pools.len());
        let shares = rng.gen_range(0..=1_000_000_000u64);

        for (fee, liquidity) in RATES {
            let a = sale_units(&pools, selected, &big(shares), fee, liquidity);
            let b = sale_units(&pools, selected, &big(shares + FEE_STEP), fee, liquidity);
            assert!(b.coins >= a.coins, "{pools:?} outcome {selected} shares {shares}");
            assert!(a.coins <= big(shares), "sold {shares} shares for {} coins", a.coins);
        }
    }
}

#[test]
fn simulations_never_negative() {
    let mut rng = ChaCha8Rng::seed_from_u64(1234);

    for _ in 0..CASES {
        let yes = rng.gen_range(1_000u64..=10_000_000);
        let no = rng.gen_range(1_000u64..=10_000_000);
        let market = two_sided_market([yes, no], dec!(0.01), dec!(0.1));
        let outcome = OutcomeId(rng.gen_range(0..=1));
        let units: u64 = rng.gen_range(0..=10_000_000);

        let coins = Coins::from_units(market.collateral().clone(), units);
        let bought = simulate_purchase(&market, outcome, &coins);
        assert!(!bought.shares.is_negative());
        assert!(!bought.fees.is_negative());
        assert!(!bought.liquidity.is_negative());

        let shares = Shares::from_units(market.share_kind().clone(), units);
        let sold = simulate_sale(&market, outcome, &shares);
        assert!(!sold.coins.is_negative());
        assert_eq!(sold.price.is_none(), units == 0);
    }
}

#[test]
fn odds_are_normalized() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);

    for _ in 0..CASES {
        let pools = random_pools(&mut rng);
        let odds = odds(&pools);
        let sum: Decimal = odds.iter().sum();
        let tolerance = Decimal::new(odds.len() as i64, 28);

        assert!((Decimal::ONE - sum).abs() <= tolerance, "odds {odds:?} sum to {sum}");
        assert!(odds.iter().all(|o| *o > Decimal::ZERO && *o < Decimal::ONE));
    }

    // one pool dwarfs the others by up to 15 orders of magnitude
    for _ in 0..CASES {
        let mut pools = random_pools(&mut rng);
        let heavy = rng.gen_range(0..pools.len());
        pools[heavy] *= BigUint::from(10u8).pow(rng.gen_range(6..=15));

        let odds = odds(&pools);
        let sum: Decimal = odds.iter().sum();
        let tolerance = Decimal::new(odds.len() as i64, 28);

        assert!((Decimal::ONE - sum).abs() <= tolerance, "odds {odds:?} sum to {sum}");
        assert!(odds.iter().all(|o| *o > Decimal::ZERO), "{pools:?} gave {odds:?}");
    }
}

#[test]
fn determinism() {
    let mut first = ChaCha8Rng::seed_from_u64(5);
    let mut second = ChaCha8Rng::seed_from_u64(5);

    for _ in 0..50 {
        let pools = random_pools(&mut first);
        assert_eq!(pools, random_pools(&mut second));
        let a = purchase_units(&pools, 0, &big(123_456), dec!(0.02), dec!(0.1));
        let b = purchase_units(&pools, 0, &big(123_456), dec!(0.02), dec!(0.1));
        assert_eq!(a, b);
    }
}

// ============================================================================
// WORKED SCENARIOS
// ============================================================================

#[test]
fn fee_is_exact_floor() {
    let market = two_sided_market([1_000_000, 1_000_000], dec!(0.02), dec!(0.1));
    let amount = Coins::from_units(market.collateral().clone(), 1_000_000);
    let result = simulate_purchase(&market, OutcomeId(0), &amount);
    assert_eq!(result.fees.units(), &BigInt::from(20_000));
}

#[test]
fn unit_step_with_fee_can_lose_a_share() {
    let pools = [big(919_499_396), big(270_009_617)];

    let a = purchase_units(&pools, 0, &big(311_752_998), dec!(0.05), dec!(0.1));
    let b = purchase_units(&pools, 0, &big(311_752_999), dec!(0.05), dec!(0.1));

    // same fee, one more unit of liquidity
    assert_eq!(a.fee, b.fee);
    assert_eq!(&b.liquidity - &a.liquidity, big(1));
    assert_eq!(a.shares, big(752_437_198));
    assert_eq!(b.shares, big(752_437_197));
}

#[test]
fn zero_amount_purchase() {
    let market = two_sided_market([500_000, 500_000], dec!(0.01), dec!(0.1));
    let nothing = Coins::zero(market.collateral().clone());
    let result = simulate_purchase(&market, OutcomeId(0), &nothing);
    assert!(result.shares.is_zero());
    assert!(result.fees.is_zero());
    assert!(result.liquidity.is_zero());
    assert!(result.price.is_none());
}

#[test]
fn constant_product_purchase() {
    let config = EngineConfig::default().with_liquidity_portion(Decimal::ZERO);
    let market = Market::from_json(MARKET_JSON, &config).unwrap();
    let amount = Coins::from_units(market.collateral().clone(), 100_000);

    let result = simulate_purchase(&market, OutcomeId(0), &amount);

    // 1_100_000 - floor(10^12 / 1_100_000)
    assert_eq!(result.shares.units(), &BigInt::from(190_910));
    assert_eq!(result.price.unwrap().to_input(), "0.523807");
}

#[test]
fn odds_worked_example() {
    assert_eq!(odds(&[big(1_000_000), big(3_000_000)]), vec![dec!(0.75), dec!(0.25)]);
    assert_eq!(odds_from_values(&[dec!(1), dec!(3)]), vec![dec!(0.75), dec!(0.25)]);
}

#[test]
fn provide_keeps_odds() {
    let config = EngineConfig::default();
    let market = Market::from_json(MARKET_JSON, &config).unwrap();
    let amount = Coins::from_units(market.collateral().clone(), 500_000);

    let result = simulate_provide(&market, &amount);
    assert_eq!(result.lp_shares, big(500_000_000_000));
    assert!(result.returned.iter().all(|s| s.is_zero()));
}
