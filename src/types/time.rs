//! Ledger timestamps and the market lifecycle derived from them.

use std::fmt;

/// Nanoseconds per millisecond
pub const NS_IN_MS: u64 = 1_000_000;
pub const MS_IN_SECOND: u64 = 1_000;
pub const MS_IN_MINUTE: u64 = 60 * MS_IN_SECOND;
pub const MS_IN_HOUR: u64 = 60 * MS_IN_MINUTE;
pub const MS_IN_DAY: u64 = 24 * MS_IN_HOUR;

/// A ledger timestamp in nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Nanoseconds(pub u64);

impl Nanoseconds {
    pub fn from_ms(ms: u64) -> Self {
        Self(ms.saturating_mul(NS_IN_MS))
    }
}

impl fmt::Display for Nanoseconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

fn pluralize(unit: &str, count: u64) -> String {
    if count == 1 {
        format!("{count} {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

/// Remaining time from `from` to `to` in the largest whole unit.
///
/// ```
/// use amm_preview::types::time::{time_between, Nanoseconds};
///
/// let now = Nanoseconds::from_ms(0);
/// assert_eq!(time_between(now, Nanoseconds::from_ms(90 * 60 * 1000)), "1 hour");
/// assert_eq!(time_between(now, Nanoseconds::from_ms(3 * 24 * 3600 * 1000)), "3 days");
/// assert_eq!(time_between(now, Nanoseconds(10)), "0 days");
/// ```
pub fn time_between(from: Nanoseconds, to: Nanoseconds) -> String {
    let ms = to.0.saturating_sub(from.0) / NS_IN_MS;
    let units = [
        ("day", MS_IN_DAY),
        ("hour", MS_IN_HOUR),
        ("minute", MS_IN_MINUTE),
        ("second", MS_IN_SECOND),
    ];

    units
        .iter()
        .find(|(_, size)| ms >= *size)
        .map(|(unit, size)| pluralize(unit, ms / size))
        .unwrap_or_else(|| "0 days".to_owned())
}

// ============================================================================
// MarketStatus
// ============================================================================

/// Lifecycle phase of a market at a given instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketStatus {
    /// Deposits and withdrawals are both open
    Withdrawals { time_left: String },
    /// Withdrawals closed, deposits still open
    Deposits { time_left: String },
    /// Trading closed, waiting for the arbitrator
    Deciding,
    /// A winner has been declared (outcome label)
    Decided { winner: String },
}

impl MarketStatus {
    /// Derive the phase from the stop dates and an optional winner label.
    pub fn at(
        now: Nanoseconds,
        withdrawal_stop: Nanoseconds,
        deposit_stop: Nanoseconds,
        winner: Option<&str>,
    ) -> Self {
        if let Some(winner) = winner {
            return MarketStatus::Decided {
                winner: winner.to_owned(),
            };
        }
        if now >= deposit_stop {
            return MarketStatus::Deciding;
        }
        if now >= withdrawal_stop {
            return MarketStatus::Deposits {
                time_left: time_between(now, deposit_stop),
            };
        }
        MarketStatus::Withdrawals {
            time_left: time_between(now, withdrawal_stop),
        }
    }

    pub fn deposits_open(&self) -> bool {
        matches!(
            self,
            MarketStatus::Withdrawals { .. } | MarketStatus::Deposits { .. }
        )
    }

    pub fn withdrawals_open(&self) -> bool {
        matches!(self, MarketStatus::Withdrawals { .. })
    }
}

impl fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketStatus::Withdrawals { time_left } => {
                write!(f, "open, withdrawals close in {time_left}")
            }
            MarketStatus::Deposits { time_left } => {
                write!(f, "deposits only, closing in {time_left}")
            }
            MarketStatus::Deciding => f.write_str("deciding"),
            MarketStatus::Decided { winner } => write!(f, "decided: {winner}"),
        }
    }
}
