//! Error types for the input boundary.
//!
//! Only the edges of the crate return errors: parsing user-typed amounts,
//! decoding ledger responses and loading configuration. The engine itself
//! treats a bad input (zero pool, wrong outcome index, mixed asset kinds)
//! as a broken precondition and panics instead of guessing a number.

use rust_decimal::Decimal;
use thiserror::Error;

/// Failure turning text into an asset quantity.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssetError {
    /// The text is not a plain decimal number
    #[error("invalid decimal amount {input:?}")]
    InvalidDecimal { input: String },

    /// Amounts typed by a user are never negative
    #[error("amount {input:?} must not be negative")]
    Negative { input: String },
}

/// Failure decoding a market or positions snapshot from the ledger.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarketError {
    #[error("market {id} has {count} outcomes, at least 2 are required")]
    TooFewOutcomes { id: u32, count: usize },

    #[error("market {id} has {count} outcomes, at most 256 are supported")]
    TooManyOutcomes { id: u32, count: usize },

    #[error("outcome at position {index} carries id {id}")]
    OutcomeOutOfOrder { index: usize, id: u8 },

    #[error("outcome {id} has an empty pool")]
    EmptyPool { id: u8 },

    #[error("{field} fee {value} is outside [0, 1)")]
    FeeOutOfRange { field: &'static str, value: Decimal },

    #[error("winner {id} is not an outcome of market {market}")]
    UnknownWinner { market: u32, id: u8 },

    #[error("field {field} is not an unsigned integer: {value:?}")]
    InvalidInteger { field: &'static str, value: String },

    #[error("field {field} is not a decimal: {value:?}")]
    InvalidDecimal { field: &'static str, value: String },

    #[error("malformed ledger response: {message}")]
    Json { message: String },
}

/// Failure loading [`crate::config::EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("liquidity portion {0} is outside [0, 1)")]
    LiquidityPortionOutOfRange(Decimal),
}
