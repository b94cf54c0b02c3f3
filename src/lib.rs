//! # AMM Preview
//!
//! Off-chain trade simulation for multi-outcome prediction markets.
//!
//! ## Architecture
//!
//! - **Types**: fixed-point assets, market snapshots, positions, status
//! - **Engine**: pool rebalancing, purchase and sale simulators, liquidity
//!   provision, odds
//! - **Config**: coin registry, liquidity portion, display precision
//!
//! ## Design Principles
//!
//! 1. **Truncate, never round**: every division rounds toward zero, in the
//!    same order as the ledger
//! 2. **No Floating Point**: base units are big integers, rates are `Decimal`
//! 3. **Pure Functions**: a simulation is a function of a snapshot and an
//!    amount; recompute instead of patching
//!
//! ## Example
//!
//! ```
//! use amm_preview::{simulate_purchase, EngineConfig, Market, OutcomeId};
//!
//! let json = r#"{
//!     "id": 1, "title": "Coin flip", "description": "",
//!     "outcomes": [
//!         { "id": 0, "label": "Heads", "pool_tokens": "1000000", "wallets": 0 },
//!         { "id": 1, "label": "Tails", "pool_tokens": "1000000", "wallets": 0 }
//!     ],
//!     "denom": "untrn", "deposit_fee": "0.01", "withdrawal_fee": "0.01",
//!     "deposit_stop_date": "0", "withdrawal_stop_date": "0", "winner": null,
//!     "total_wallets": 0, "pool_size": "2000000", "lp_shares": "1000000000000"
//! }"#;
//!
//! let market = Market::from_json(json, &EngineConfig::default()).unwrap();
//! let amount = market.parse_coins("1").unwrap();
//! let result = simulate_purchase(&market, OutcomeId(0), &amount);
//! assert_eq!(result.fees.to_string(), "0.010000 NTRN");
//! ```

// ============================================================================
// Module declarations
// ============================================================================

/// Engine configuration
pub mod config;

/// Boundary error types
pub mod error;

/// Core data types: assets, markets, positions
pub mod types;

/// Simulation engine: pool rebalancing, purchase, sale, provide, odds
pub mod engine;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use config::EngineConfig;
pub use engine::{
    add_to_pool, odds, simulate_provide, simulate_purchase, simulate_sale, OutcomeOdds,
    ProvideResult, PurchaseResult, SaleResult,
};
pub use error::{AssetError, ConfigError, MarketError};
pub use types::{Coins, Market, MarketStatus, OutcomeId, Positions, Shares, Usd};
