//! Trade simulation engine.
//!
//! ## Design Principles
//!
//! The engine reproduces the ledger's pricing off-chain:
//!
//! 1. **Bit-exact**: every intermediate value is truncated in the order the
//!    ledger truncates it, on arbitrary-precision integers
//! 2. **Pure**: no I/O and no shared state; every call takes a snapshot and
//!    returns a fresh result
//! 3. **Loud**: broken preconditions (empty pool, unknown outcome, mixed
//!    collateral) panic rather than produce a plausible wrong number
//!
//! ## Simulators
//!
//! - [`simulate_purchase`]: collateral in, shares out
//! - [`simulate_sale`]: shares in, collateral out
//! - [`simulate_provide`]: collateral in as liquidity
//! - [`odds()`]: implied probabilities from pool sizes
//!
//! ## Example
//!
//! ```
//! use amm_preview::config::EngineConfig;
//! use amm_preview::engine::{simulate_purchase, simulate_sale};
//! use amm_preview::types::{Market, MarketParams, OutcomeId};
//! use rust_decimal::Decimal;
//!
//! let config = EngineConfig::default().with_coin("untrn", "NTRN", 6);
//! let params = MarketParams {
//!     denom: "untrn".into(),
//!     deposit_fee: Decimal::new(1, 2),
//!     withdrawal_fee: Decimal::new(1, 2),
//!     ..MarketParams::default().with_pools([1_000_000u32, 1_000_000])
//! };
//! let market = Market::new(params, &config).unwrap();
//!
//! let amount = market.parse_coins("0.1").unwrap();
//! let bought = simulate_purchase(&market, OutcomeId(0), &amount);
//! assert_eq!(bought.fees.to_input(), "0.001");
//!
//! // selling straight back never returns the full deposit
//! let sold = simulate_sale(&market, OutcomeId(0), &bought.shares);
//! assert!(sold.coins < amount);
//! ```

pub mod odds;
pub(crate) mod pipeline;
pub mod pool;
pub mod provide;
pub mod purchase;
pub mod sale;

pub use odds::{odds, odds_from_values, OutcomeOdds};
pub use pool::{add_to_pool, PoolRebalance};
pub use provide::{simulate_provide, ProvideResult};
pub use purchase::{purchase_units, simulate_purchase, PurchaseResult, PurchaseUnits};
pub use sale::{sale_units, simulate_sale, SaleResult, SaleUnits};
