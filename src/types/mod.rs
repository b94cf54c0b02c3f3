//! Core data types
//!
//! All quantities are integer base units; decimals only appear when text is
//! parsed or rendered.
//!
//! ## Types
//!
//! - [`Asset`]: fixed-point quantity tagged with its kind ([`Coins`],
//!   [`Shares`], [`Usd`])
//! - [`Market`]: immutable snapshot of one prediction market
//! - [`Outcome`]: one side of a market with its pool
//! - [`Positions`]: shares an account holds per outcome
//! - [`MarketStatus`]: lifecycle phase at a given time

pub mod asset;
pub mod market;
pub mod number;
pub mod time;

pub use asset::{Asset, AssetKind, Coins, Collateral, ShareKind, Shares, Usd, UsdKind};
pub use market::{
    Market, MarketId, MarketParams, Outcome, OutcomeId, Positions, ResponseMarket,
    ResponseOutcome, ResponsePositions,
};
pub use time::{MarketStatus, Nanoseconds};
