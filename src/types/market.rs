//! Market snapshots and account positions.
//!
//! ## Lifecycle
//!
//! A [`Market`] is built fresh from every ledger read and never mutated; the
//! next read supersedes it. Construction is the only place where ledger data
//! is validated, so the engine can treat every snapshot as well-formed:
//!
//! - at least two outcomes, ids equal to their position
//! - every outcome pool strictly positive
//! - fee rates in `[0, 1)`
//!
//! ## Wire format
//!
//! The ledger query layer returns JSON with big numbers as strings:
//!
//! ```json
//! {
//!   "id": 3, "title": "...", "description": "...", "denom": "untrn",
//!   "outcomes": [{ "id": 0, "label": "Yes", "pool_tokens": "1000000", "wallets": 4 }],
//!   "deposit_fee": "0.01", "withdrawal_fee": "0.01",
//!   "deposit_stop_date": "1700000000000000000",
//!   "withdrawal_stop_date": "1690000000000000000",
//!   "winner": null, "total_wallets": 9,
//!   "pool_size": "2000000", "lp_shares": "1000000000000", "lp_wallets": 1
//! }
//! ```

use std::fmt;

use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::config::EngineConfig;
use crate::error::MarketError;
use crate::types::asset::{Coins, Collateral, ShareKind, Shares};
use crate::types::number::{ratio_to_decimal, to_percentage};
use crate::types::time::{MarketStatus, Nanoseconds};

// ============================================================================
// Identifiers
// ============================================================================

/// Ledger-assigned market id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct MarketId(pub u32);

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Position of an outcome within its market.
///
/// Outcome ids index the pool vector directly, so the order of
/// [`Market::outcomes`] is significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct OutcomeId(pub u8);

impl OutcomeId {
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Display for OutcomeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// Outcome / Market
// ============================================================================

/// One side of a market and its current pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub id: OutcomeId,
    pub label: String,
    /// Current AMM pool for this outcome
    pub pool_shares: Shares,
    /// Wallets holding shares of this outcome
    pub wallets: u32,
}

impl Outcome {
    /// Pool size in base units (always positive for a validated market)
    pub fn pool(&self) -> &BigUint {
        self.pool_shares.units().magnitude()
    }
}

/// Unvalidated market fields, as read from the ledger or built in tests.
#[derive(Debug, Clone, Default)]
pub struct MarketParams {
    pub id: MarketId,
    pub title: String,
    pub description: String,
    pub denom: String,
    pub deposit_fee: Decimal,
    pub withdrawal_fee: Decimal,
    /// `(label, pool in base units, wallets)` per outcome, in id order
    pub outcomes: Vec<(String, BigUint, u32)>,
    pub deposit_stop_date: Nanoseconds,
    pub withdrawal_stop_date: Nanoseconds,
    pub winner: Option<u8>,
    pub total_wallets: u32,
    pub pool_size: BigUint,
    pub lp_shares: BigUint,
    pub lp_wallets: u32,
}

impl MarketParams {
    /// Outcomes labelled "Outcome 0", "Outcome 1", ... with the given pools.
    pub fn with_pools<I, T>(mut self, pools: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<BigUint>,
    {
        self.outcomes = pools
            .into_iter()
            .enumerate()
            .map(|(i, pool)| (format!("Outcome {i}"), pool.into(), 0))
            .collect();
        self
    }
}

/// Immutable snapshot of one market.
#[derive(Debug, Clone)]
pub struct Market {
    id: MarketId,
    title: String,
    description: String,
    collateral: Collateral,
    share_kind: ShareKind,
    deposit_fee: Decimal,
    withdrawal_fee: Decimal,
    liquidity_portion: Decimal,
    outcomes: Vec<Outcome>,
    deposit_stop_date: Nanoseconds,
    withdrawal_stop_date: Nanoseconds,
    winner: Option<OutcomeId>,
    total_wallets: u32,
    pool_size: Coins,
    lp_shares: BigUint,
    lp_wallets: u32,
}

fn check_fee(field: &'static str, value: Decimal) -> Result<Decimal, MarketError> {
    if value.is_sign_negative() || value >= Decimal::ONE {
        return Err(MarketError::FeeOutOfRange { field, value });
    }
    Ok(value)
}

impl Market {
    /// Validate `params` and build a snapshot.
    ///
    /// The collateral's symbol and exponent come from the configured coin
    /// registry; the liquidity portion is the configured protocol constant.
    pub fn new(params: MarketParams, config: &EngineConfig) -> Result<Self, MarketError> {
        let MarketParams {
            id,
            title,
            description,
            denom,
            deposit_fee,
            withdrawal_fee,
            outcomes,
            deposit_stop_date,
            withdrawal_stop_date,
            winner,
            total_wallets,
            pool_size,
            lp_shares,
            lp_wallets,
        } = params;

        if outcomes.len() < 2 {
            return Err(MarketError::TooFewOutcomes {
                id: id.0,
                count: outcomes.len(),
            });
        }
        if outcomes.len() > usize::from(u8::MAX) + 1 {
            return Err(MarketError::TooManyOutcomes {
                id: id.0,
                count: outcomes.len(),
            });
        }

        let deposit_fee = check_fee("deposit", deposit_fee)?;
        let withdrawal_fee = check_fee("withdrawal", withdrawal_fee)?;

        let collateral = Collateral::from_config(config, &denom);
        let share_kind = ShareKind::for_collateral(&collateral, config.shares_precision);

        let outcomes = outcomes
            .into_iter()
            .enumerate()
            .map(|(index, (label, pool, wallets))| {
                let id = OutcomeId(index as u8);
                if pool.is_zero() {
                    return Err(MarketError::EmptyPool { id: id.0 });
                }
                Ok(Outcome {
                    id,
                    label,
                    pool_shares: Shares::from_units(share_kind.clone(), BigInt::from(pool)),
                    wallets,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let winner = match winner {
            Some(w) if usize::from(w) >= outcomes.len() => {
                return Err(MarketError::UnknownWinner { market: id.0, id: w })
            }
            w => w.map(OutcomeId),
        };

        Ok(Self {
            id,
            title,
            description,
            pool_size: Coins::from_units(collateral.clone(), BigInt::from(pool_size)),
            collateral,
            share_kind,
            deposit_fee,
            withdrawal_fee,
            liquidity_portion: config.liquidity_portion,
            outcomes,
            deposit_stop_date,
            withdrawal_stop_date,
            winner,
            total_wallets,
            lp_shares,
            lp_wallets,
        })
    }

    /// Decode a ledger query response.
    pub fn from_response(
        response: ResponseMarket,
        config: &EngineConfig,
    ) -> Result<Self, MarketError> {
        let outcomes = response
            .outcomes
            .into_iter()
            .enumerate()
            .map(|(index, outcome)| {
                if usize::from(outcome.id) != index {
                    return Err(MarketError::OutcomeOutOfOrder {
                        index,
                        id: outcome.id,
                    });
                }
                let pool = parse_units("pool_tokens", &outcome.pool_tokens)?;
                Ok((outcome.label, pool, outcome.wallets))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let params = MarketParams {
            id: MarketId(response.id),
            title: response.title,
            description: response.description,
            denom: response.denom,
            deposit_fee: parse_decimal("deposit_fee", &response.deposit_fee)?,
            withdrawal_fee: parse_decimal("withdrawal_fee", &response.withdrawal_fee)?,
            outcomes,
            deposit_stop_date: parse_timestamp("deposit_stop_date", &response.deposit_stop_date)?,
            withdrawal_stop_date: parse_timestamp(
                "withdrawal_stop_date",
                &response.withdrawal_stop_date,
            )?,
            winner: response.winner,
            total_wallets: response.total_wallets,
            pool_size: parse_units("pool_size", &response.pool_size)?,
            lp_shares: parse_units("lp_shares", &response.lp_shares)?,
            // older contracts do not report LP wallets; the house always holds some
            lp_wallets: response.lp_wallets.filter(|w| *w > 0).unwrap_or(1),
        };
        Self::new(params, config)
    }

    /// Decode a ledger query response from JSON text.
    pub fn from_json(json: &str, config: &EngineConfig) -> Result<Self, MarketError> {
        let response: ResponseMarket = serde_json::from_str(json).map_err(|e| MarketError::Json {
            message: e.to_string(),
        })?;
        Self::from_response(response, config)
    }

    pub fn id(&self) -> MarketId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Collateral kind of this market
    pub fn collateral(&self) -> &Collateral {
        &self.collateral
    }

    /// Share kind of this market
    pub fn share_kind(&self) -> &ShareKind {
        &self.share_kind
    }

    pub fn denom(&self) -> &str {
        self.collateral.denom()
    }

    pub fn deposit_fee(&self) -> Decimal {
        self.deposit_fee
    }

    pub fn withdrawal_fee(&self) -> Decimal {
        self.withdrawal_fee
    }

    pub fn liquidity_portion(&self) -> Decimal {
        self.liquidity_portion
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// Outcome by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not an outcome of this market.
    pub fn outcome(&self, id: OutcomeId) -> &Outcome {
        self.get_outcome(id).unwrap_or_else(|| {
            panic!(
                "outcome {} out of range for market {} with {} outcomes",
                id,
                self.id,
                self.outcomes.len()
            )
        })
    }

    pub fn get_outcome(&self, id: OutcomeId) -> Option<&Outcome> {
        self.outcomes.get(id.index())
    }

    /// Per-outcome pool sizes in base units, in id order.
    pub fn pool_sizes(&self) -> Vec<BigUint> {
        self.outcomes.iter().map(|o| o.pool().clone()).collect()
    }

    pub fn deposit_stop_date(&self) -> Nanoseconds {
        self.deposit_stop_date
    }

    pub fn withdrawal_stop_date(&self) -> Nanoseconds {
        self.withdrawal_stop_date
    }

    pub fn winner(&self) -> Option<&Outcome> {
        self.winner.map(|id| self.outcome(id))
    }

    pub fn total_wallets(&self) -> u32 {
        self.total_wallets
    }

    /// Total collateral held by the market
    pub fn pool_size(&self) -> &Coins {
        &self.pool_size
    }

    /// Outstanding liquidity-provider shares
    pub fn lp_shares(&self) -> &BigUint {
        &self.lp_shares
    }

    pub fn lp_wallets(&self) -> u32 {
        self.lp_wallets
    }

    /// Percentage of the liquidity pool owned by `lp` LP shares.
    ///
    /// Holdings above the outstanding total count as the whole pool; a market
    /// without LP shares reports zero.
    pub fn pool_portion(&self, lp: &BigUint) -> Decimal {
        if self.lp_shares.is_zero() {
            return Decimal::ZERO;
        }
        let owned = std::cmp::min(lp, &self.lp_shares);
        to_percentage(ratio_to_decimal(owned, &self.lp_shares))
    }

    /// Lifecycle phase at `now`.
    pub fn status(&self, now: Nanoseconds) -> MarketStatus {
        MarketStatus::at(
            now,
            self.withdrawal_stop_date,
            self.deposit_stop_date,
            self.winner().map(|o| o.label.as_str()),
        )
    }

    /// Collateral paid out for `shares` if their outcome wins.
    pub fn potential_winnings(&self, shares: &Shares) -> Coins {
        shares.to_coins(&self.collateral)
    }

    /// Parse a user-typed collateral amount for this market.
    pub fn parse_coins(&self, input: &str) -> Result<Coins, crate::error::AssetError> {
        Coins::parse(self.collateral.clone(), input)
    }

    /// Parse a user-typed share amount for this market.
    pub fn parse_shares(&self, input: &str) -> Result<Shares, crate::error::AssetError> {
        Shares::parse(self.share_kind.clone(), input)
    }
}

// ============================================================================
// Positions
// ============================================================================

/// Shares an account holds in each outcome of one market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Positions {
    outcomes: Vec<Shares>,
    lp_shares: BigUint,
}

impl Positions {
    /// Decode a positions response against the market it belongs to.
    pub fn from_response(
        response: ResponsePositions,
        market: &Market,
    ) -> Result<Self, MarketError> {
        let kind = market.share_kind();
        let outcomes = response
            .outcomes
            .iter()
            .map(|amount| {
                parse_units("outcomes", amount)
                    .map(|units| Shares::from_units(kind.clone(), BigInt::from(units)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let lp_shares = match &response.shares {
            Some(shares) => parse_units("shares", shares)?,
            None => BigUint::zero(),
        };
        Ok(Self {
            outcomes,
            lp_shares,
        })
    }

    pub fn from_json(json: &str, market: &Market) -> Result<Self, MarketError> {
        let response: ResponsePositions =
            serde_json::from_str(json).map_err(|e| MarketError::Json {
                message: e.to_string(),
            })?;
        Self::from_response(response, market)
    }

    /// Shares held in `outcome`; zero when the account never traded it.
    pub fn shares(&self, market: &Market, outcome: OutcomeId) -> Shares {
        self.outcomes
            .get(outcome.index())
            .cloned()
            .unwrap_or_else(|| Shares::zero(market.share_kind().clone()))
    }

    pub fn has_shares(&self) -> bool {
        self.outcomes.iter().any(|s| !s.is_zero())
    }

    /// LP shares held by the account
    pub fn lp_shares(&self) -> &BigUint {
        &self.lp_shares
    }
}

// ============================================================================
// Ledger responses
// ============================================================================

/// Market as returned by the ledger query layer.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMarket {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub outcomes: Vec<ResponseOutcome>,
    pub denom: String,
    pub deposit_fee: String,
    pub withdrawal_fee: String,
    pub deposit_stop_date: String,
    pub withdrawal_stop_date: String,
    pub winner: Option<u8>,
    pub total_wallets: u32,
    pub pool_size: String,
    pub lp_shares: String,
    #[serde(default)]
    pub lp_wallets: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseOutcome {
    pub id: u8,
    pub label: String,
    pub pool_tokens: String,
    pub wallets: u32,
}

/// Per-outcome share balances of one account.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponsePositions {
    pub outcomes: Vec<String>,
    /// LP shares; absent from older query layers
    #[serde(default)]
    pub shares: Option<String>,
}

/// Unsigned integer base units. Token balances are ledger decimals; any
/// fractional part is below one base unit and is dropped.
fn parse_units(field: &'static str, value: &str) -> Result<BigUint, MarketError> {
    let invalid = || MarketError::InvalidInteger {
        field,
        value: value.to_owned(),
    };
    let integer = match value.split_once('.') {
        Some((integer, fraction)) if fraction.bytes().all(|b| b.is_ascii_digit()) => integer,
        Some(_) => return Err(invalid()),
        None => value,
    };
    if integer.is_empty() || !integer.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    integer.parse::<BigUint>().map_err(|_| invalid())
}

fn parse_decimal(field: &'static str, value: &str) -> Result<Decimal, MarketError> {
    value
        .parse::<Decimal>()
        .map_err(|_| MarketError::InvalidDecimal {
            field,
            value: value.to_owned(),
        })
}

fn parse_timestamp(field: &'static str, value: &str) -> Result<Nanoseconds, MarketError> {
    value
        .parse::<u64>()
        .map(Nanoseconds)
        .map_err(|_| MarketError::InvalidInteger {
            field,
            value: value.to_owned(),
        })
}

// ============================================================================
// Unit Tests
// ============================================================================
