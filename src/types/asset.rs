//! Fixed-point asset quantities.
//!
//! ## Overview
//!
//! An [`Asset`] is an integer number of base units tagged with its kind.
//! The kind carries the symbol, the exponent and the display precision, so a
//! value can never change exponent after construction and quantities of
//! different kinds cannot be mixed:
//!
//! - [`Coins`]: collateral of a given denom (`untrn`, `ibc/...`)
//! - [`Shares`]: outcome shares, on the same base-unit scale as the
//!   collateral they were bought with
//! - [`Usd`]: US dollars in cents, used for display and price toggles
//!
//! ## Arithmetic
//!
//! `plus`/`minus` require identical kinds and panic otherwise. `times` and
//! `divided_by` scale by a `Decimal` factor and truncate toward zero.
//!
//! ## Example
//!
//! ```
//! use amm_preview::config::EngineConfig;
//! use amm_preview::types::asset::{Coins, Collateral};
//! use rust_decimal::Decimal;
//!
//! let config = EngineConfig::default();
//! let ntrn = Collateral::from_config(&config, "untrn");
//!
//! let amount = Coins::parse(ntrn.clone(), "1234.5678919").unwrap();
//! assert_eq!(amount.units().to_string(), "1234567891");
//! assert_eq!(amount.to_input(), "1234.567891");
//! assert_eq!(amount.to_format(true), "1,234.5 NTRN");
//!
//! let half = amount.times(Decimal::new(5, 1));
//! assert_eq!(half.to_full_precision(false), "617.283945");
//! ```

use std::cmp::Ordering;
use std::fmt;

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use rust_decimal::Decimal;

use crate::config::{CoinConfig, EngineConfig};
use crate::error::AssetError;
use crate::types::number::{
    decimal_to_units, div_decimal_trunc, format_to_significant_digits, mul_decimal_trunc,
    pow10_signed, units_to_decimal, units_to_fixed, units_to_grouped,
};

/// Symbol shown after share quantities.
pub const SHARES_SYMBOL: &str = "shares";

/// Cents per dollar.
pub const USD_EXPONENT: u8 = 2;

// ============================================================================
// Asset kinds
// ============================================================================

/// What an [`Asset`] measures.
pub trait AssetKind: Clone + PartialEq + fmt::Debug {
    /// Suffix used by the `with_suffix` renderers
    fn symbol(&self) -> &str;

    /// Decimal places between base units and one whole unit
    fn exponent(&self) -> u8;

    /// Decimal places kept by input and full-precision rendering
    fn max_decimal_places(&self) -> u32;

    /// Compact rendering used by [`Asset::to_format`]
    fn compact(&self, units: &BigInt) -> String {
        units_to_grouped(units, self.exponent(), self.max_decimal_places())
    }
}

/// Collateral of one denom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collateral {
    denom: String,
    symbol: String,
    exponent: u8,
    significant_digits: u32,
}

impl Collateral {
    /// Build from a registry entry.
    pub fn new(coin: CoinConfig, significant_digits: u32) -> Self {
        Self {
            denom: coin.denom,
            symbol: coin.symbol,
            exponent: coin.exponent,
            significant_digits,
        }
    }

    /// Look `denom` up in the configured registry.
    pub fn from_config(config: &EngineConfig, denom: &str) -> Self {
        Self::new(config.coin_config(denom), config.significant_digits)
    }

    /// On-chain denom
    pub fn denom(&self) -> &str {
        &self.denom
    }
}

impl AssetKind for Collateral {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn exponent(&self) -> u8 {
        self.exponent
    }

    fn max_decimal_places(&self) -> u32 {
        u32::from(self.exponent)
    }

    fn compact(&self, units: &BigInt) -> String {
        format_to_significant_digits(
            units,
            self.exponent,
            self.significant_digits,
            u32::from(self.exponent),
        )
    }
}

/// Outcome shares of a market collateralised in `denom`.
///
/// Shares and collateral share a 1:1 base-unit scale, so the exponent is
/// always the collateral's. Display precision is not part of the identity:
/// shares of one collateral combine whatever precision they render with.
#[derive(Debug, Clone)]
pub struct ShareKind {
    denom: String,
    exponent: u8,
    precision: u32,
}

impl ShareKind {
    /// Shares of the given collateral, displayed with `precision` decimals.
    pub fn for_collateral(collateral: &Collateral, precision: u32) -> Self {
        Self {
            denom: collateral.denom.clone(),
            exponent: collateral.exponent,
            precision,
        }
    }

    /// Denom of the backing collateral
    pub fn denom(&self) -> &str {
        &self.denom
    }
}

impl PartialEq for ShareKind {
    fn eq(&self, other: &Self) -> bool {
        self.denom == other.denom && self.exponent == other.exponent
    }
}

impl Eq for ShareKind {}

impl AssetKind for ShareKind {
    fn symbol(&self) -> &str {
        SHARES_SYMBOL
    }

    fn exponent(&self) -> u8 {
        self.exponent
    }

    fn max_decimal_places(&self) -> u32 {
        self.precision.min(u32::from(self.exponent))
    }
}

/// US dollars, stored as cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UsdKind;

impl AssetKind for UsdKind {
    fn symbol(&self) -> &str {
        "USD"
    }

    fn exponent(&self) -> u8 {
        USD_EXPONENT
    }

    fn max_decimal_places(&self) -> u32 {
        u32::from(USD_EXPONENT)
    }
}

// ============================================================================
// Asset
// ============================================================================

/// An integer quantity of base units of kind `K`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset<K: AssetKind> {
    kind: K,
    units: BigInt,
}

/// Collateral quantity
pub type Coins = Asset<Collateral>;

/// Outcome share quantity
pub type Shares = Asset<ShareKind>;

/// Dollar quantity
pub type Usd = Asset<UsdKind>;

impl<K: AssetKind> Asset<K> {
    /// Wrap a base-unit amount.
    pub fn from_units(kind: K, units: impl Into<BigInt>) -> Self {
        Self {
            kind,
            units: units.into(),
        }
    }

    /// Zero of the given kind.
    pub fn zero(kind: K) -> Self {
        Self::from_units(kind, BigInt::zero())
    }

    /// Convert a human decimal value, truncating below one base unit.
    pub fn from_value(kind: K, value: Decimal) -> Self {
        let units = decimal_to_units(value, kind.exponent());
        Self::from_units(kind, units)
    }

    /// Parse user-typed decimal text such as `"12.5"` or `".25"`.
    ///
    /// Digits beyond the asset's exponent are dropped, never rounded.
    ///
    /// # Errors
    ///
    /// * [`AssetError::Negative`] for a leading minus sign
    /// * [`AssetError::InvalidDecimal`] for anything that is not
    ///   `digits[.digits]`
    pub fn parse(kind: K, input: &str) -> Result<Self, AssetError> {
        let text = input.trim();
        if text.starts_with('-') {
            return Err(AssetError::Negative {
                input: input.to_owned(),
            });
        }

        let invalid = || AssetError::InvalidDecimal {
            input: input.to_owned(),
        };

        let (integer, fraction) = match text.split_once('.') {
            Some((i, f)) => (i, f),
            None => (text, ""),
        };
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        let empty = integer.is_empty() && fraction.is_empty();
        if empty || !all_digits(integer) || !all_digits(fraction) {
            return Err(invalid());
        }

        let exponent = usize::from(kind.exponent());
        let mut digits = String::with_capacity(integer.len() + exponent);
        digits.push_str(integer);
        for i in 0..exponent {
            digits.push(fraction.as_bytes().get(i).map_or('0', |b| char::from(*b)));
        }
        if digits.is_empty() {
            digits.push('0');
        }

        let units = digits.parse::<BigInt>().map_err(|_| invalid())?;
        Ok(Self::from_units(kind, units))
    }

    /// Base units
    pub fn units(&self) -> &BigInt {
        &self.units
    }

    /// Kind tag
    pub fn kind(&self) -> &K {
        &self.kind
    }

    pub fn symbol(&self) -> &str {
        self.kind.symbol()
    }

    pub fn exponent(&self) -> u8 {
        self.kind.exponent()
    }

    pub fn is_zero(&self) -> bool {
        self.units.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.units.is_negative()
    }

    /// Value as a `Decimal`, if it fits.
    pub fn to_decimal(&self) -> Option<Decimal> {
        units_to_decimal(&self.units, self.exponent())
    }

    /// Plain text for an input field: truncated, no grouping, no suffix.
    pub fn to_input(&self) -> String {
        units_to_fixed(&self.units, self.exponent(), self.kind.max_decimal_places())
    }

    /// Grouped text padded to the maximum decimal places.
    pub fn to_full_precision(&self, with_suffix: bool) -> String {
        let text = units_to_grouped(&self.units, self.exponent(), self.kind.max_decimal_places());
        self.suffixed(text, with_suffix)
    }

    /// Compact text for summaries.
    pub fn to_format(&self, with_suffix: bool) -> String {
        let text = self.kind.compact(&self.units);
        self.suffixed(text, with_suffix)
    }

    fn suffixed(&self, text: String, with_suffix: bool) -> String {
        if with_suffix {
            format!("{} {}", text, self.kind.symbol())
        } else {
            text
        }
    }

    fn assert_same_kind(&self, other: &Self, op: &str) {
        assert!(
            self.kind == other.kind,
            "cannot {} {:?} and {:?}",
            op,
            self.kind,
            other.kind
        );
    }

    /// Sum of two quantities of the same kind.
    ///
    /// # Panics
    ///
    /// Panics if the kinds differ.
    pub fn plus(&self, other: &Self) -> Self {
        self.assert_same_kind(other, "add");
        Self::from_units(self.kind.clone(), &self.units + &other.units)
    }

    /// Difference of two quantities of the same kind. May go negative.
    ///
    /// # Panics
    ///
    /// Panics if the kinds differ.
    pub fn minus(&self, other: &Self) -> Self {
        self.assert_same_kind(other, "subtract");
        Self::from_units(self.kind.clone(), &self.units - &other.units)
    }

    /// Scale by `factor`, truncating toward zero.
    pub fn times(&self, factor: Decimal) -> Self {
        Self::from_units(self.kind.clone(), mul_decimal_trunc(&self.units, factor))
    }

    /// Divide by `divisor`, truncating toward zero.
    ///
    /// # Panics
    ///
    /// Panics if `divisor` is zero.
    pub fn divided_by(&self, divisor: Decimal) -> Self {
        Self::from_units(self.kind.clone(), div_decimal_trunc(&self.units, divisor))
    }
}

impl<K: AssetKind> PartialOrd for Asset<K> {
    /// Quantities of different kinds are unordered.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.kind == other.kind {
            Some(self.units.cmp(&other.units))
        } else {
            None
        }
    }
}

impl<K: AssetKind> fmt::Display for Asset<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_format(true))
    }
}

// ============================================================================
// Conversions between kinds
// ============================================================================

impl Coins {
    /// Denom of the collateral
    pub fn denom(&self) -> &str {
        self.kind.denom()
    }

    /// Dollar value at `price` USD per whole coin, truncated to cents.
    pub fn to_usd(&self, price: Decimal) -> Usd {
        let cents = mul_decimal_trunc(&(&self.units * pow10_signed(u32::from(USD_EXPONENT))), price)
            / pow10_signed(u32::from(self.exponent()));
        Usd::from_units(UsdKind, cents)
    }

    /// Shares bought 1:1 with these coins.
    pub fn to_shares(&self, precision: u32) -> Shares {
        Shares::from_units(
            ShareKind::for_collateral(&self.kind, precision),
            self.units.clone(),
        )
    }

    /// Collateral paid per whole share: `self / shares`, truncated.
    ///
    /// Returns `None` when no shares moved.
    ///
    /// # Panics
    ///
    /// Panics if the shares belong to a different collateral.
    pub fn per_share(&self, shares: &Shares) -> Option<Coins> {
        assert_eq!(
            self.denom(),
            shares.kind.denom(),
            "price of shares in a foreign collateral"
        );
        if shares.is_zero() {
            return None;
        }
        let units = &self.units * pow10_signed(u32::from(self.exponent())) / &shares.units;
        Some(Coins::from_units(self.kind.clone(), units))
    }
}

impl Shares {
    /// Collateral these shares redeem for if their outcome wins.
    ///
    /// # Panics
    ///
    /// Panics if `collateral` is not the denom the shares were bought with.
    pub fn to_coins(&self, collateral: &Collateral) -> Coins {
        assert_eq!(
            self.kind.denom(),
            collateral.denom(),
            "redeeming shares for a foreign collateral"
        );
        Coins::from_units(collateral.clone(), self.units.clone())
    }
}

impl Usd {
    /// Dollars from a decimal value such as `12.34`.
    pub fn from_dollars(value: Decimal) -> Self {
        Self::from_value(UsdKind, value)
    }

    /// Coins bought with these dollars at `price` USD per whole coin.
    ///
    /// # Panics
    ///
    /// Panics if `price` is not positive.
    pub fn to_coins(&self, collateral: Collateral, price: Decimal) -> Coins {
        assert!(price > Decimal::ZERO, "non-positive coin price {price}");
        let numerator = &self.units * pow10_signed(u32::from(collateral.exponent()));
        let units = div_decimal_trunc(&numerator, price) / pow10_signed(u32::from(USD_EXPONENT));
        Coins::from_units(collateral, units)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
