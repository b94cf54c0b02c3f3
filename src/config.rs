//! Engine configuration.
//!
//! Loaded from TOML. Every field is optional in the file and falls back to
//! the values the hosted client ships with.
//!
//! ```toml
//! liquidity_portion = "0.1"
//! significant_digits = 5
//! shares_precision = 3
//!
//! [[coins]]
//! denom = "untrn"
//! symbol = "NTRN"
//! exponent = 6
//! ```

use std::collections::HashMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::ConfigError;

/// Portion of every deposit that is seeded into the pool as liquidity.
pub const DEFAULT_LIQUIDITY_PORTION: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Significant digits shown by the compact coin format.
pub const DEFAULT_SIGNIFICANT_DIGITS: u32 = 5;

/// Decimal places shown for outcome shares.
pub const DEFAULT_SHARES_PRECISION: u32 = 3;

/// USDC over IBC, the usual collateral of a market.
pub const USDC_DENOM: &str =
    "ibc/B559A80D62249C8AA07A380E2A2BEA6E5CA9A6F079C912C3A9E9B494105E4F81";

// ============================================================================
// Coin registry
// ============================================================================

/// Display metadata for one collateral denom.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CoinConfig {
    /// On-chain denom (e.g. `untrn`, `ibc/...`)
    pub denom: String,
    /// Ticker shown to users
    pub symbol: String,
    /// Decimal places between base units and one whole coin
    pub exponent: u8,
}

impl CoinConfig {
    fn new(denom: &str, symbol: &str, exponent: u8) -> Self {
        Self {
            denom: denom.to_owned(),
            symbol: symbol.to_owned(),
            exponent,
        }
    }

    /// Metadata used for denoms missing from the registry.
    pub fn unknown(denom: &str) -> Self {
        Self::new(denom, denom, 0)
    }
}

fn default_coins() -> Vec<CoinConfig> {
    vec![
        CoinConfig::new("untrn", "NTRN", 6),
        CoinConfig::new(
            "ibc/C4CFF46FD6DE35CA4CF4CE031E643C8FDC9BA4B99AE598E9B0ED98FE3A2319F9",
            "ATOM",
            6,
        ),
        CoinConfig::new(
            "factory/neutron1k6hr0f83e7un2wjf29cspk7j69jrnskk65k3ek2nj9dztrlzpj6q00rtsa/udatom",
            "dATOM",
            6,
        ),
        CoinConfig::new(
            "ibc/B7864B03E1B9FD4F049243E92ABD691586F682137037A9F3FCA5222815620B3C",
            "stATOM",
            6,
        ),
        CoinConfig::new(
            "ibc/75249A18DEFBEFE55F83B1C70CAD234DF164F174C6BC51682EE92C2C81C18C93",
            "stOSMO",
            6,
        ),
        CoinConfig::new(
            "ibc/BAA1D21893B1D36865C6CA44D18F4ACF08BAD70CB6863C4722E0A61703808F77",
            "stDYDX",
            18,
        ),
        CoinConfig::new(
            "ibc/6569E05DEE32B339D9286A52BE33DFCEFC97267F23EF9CFDE0C055140967A9A5",
            "stTIA",
            6,
        ),
        CoinConfig::new(
            "ibc/8D0C1AC5A72FB7EC187632D01BACBB68EF743CA1AF16A15C00ACBB9CF49A0070",
            "stDYM",
            18,
        ),
        CoinConfig::new(
            "ibc/C0E66D1C81D8AAF0E6896E05190FDFBC222367148F86AC3EA679C28327A763CD",
            "AXL",
            6,
        ),
        CoinConfig::new(
            "ibc/376222D6D9DAE23092E29740E56B758580935A6D77C24C2ABD57A6A78A1F3955",
            "OSMO",
            6,
        ),
        CoinConfig::new(
            "ibc/773B4D0A3CD667B2275D5A4A7A2F0909C0BA0F4059C0B9181E680DDF4965DCC7",
            "TIA",
            6,
        ),
        CoinConfig::new(
            "ibc/3649CE0C8A2C79048D8C6F31FF18FA69C9BC7EB193512E0BD03B733011290445",
            "stkATOM",
            6,
        ),
        CoinConfig::new(
            "ibc/4A6A46D4263F2ED3DCE9CF866FE15E6903FB5E12D87EB8BDC1B6B1A1E2D397B4",
            "DYM",
            18,
        ),
        CoinConfig::new(USDC_DENOM, "USDC", 6),
    ]
}

// ============================================================================
// EngineConfig
// ============================================================================

/// Raw file layout; missing fields are filled from the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    liquidity_portion: Option<Decimal>,
    significant_digits: Option<u32>,
    shares_precision: Option<u32>,
    coins: Option<Vec<CoinConfig>>,
}

/// Settings shared by the asset primitive and the simulators.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fraction of a post-fee trade seeded into the pool, in `[0, 1)`
    pub liquidity_portion: Decimal,
    /// Significant digits kept by the compact coin format
    pub significant_digits: u32,
    /// Decimal places shown for shares
    pub shares_precision: u32,
    coins: HashMap<String, CoinConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            liquidity_portion: DEFAULT_LIQUIDITY_PORTION,
            significant_digits: DEFAULT_SIGNIFICANT_DIGITS,
            shares_precision: DEFAULT_SHARES_PRECISION,
            coins: index_coins(default_coins()),
        }
    }
}

fn index_coins(coins: Vec<CoinConfig>) -> HashMap<String, CoinConfig> {
    coins.into_iter().map(|c| (c.denom.clone(), c)).collect()
}

impl EngineConfig {
    /// Parse a TOML document.
    ///
    /// A `coins` table, when present, replaces the default registry.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text)?;
        let defaults = Self::default();

        let liquidity_portion = raw.liquidity_portion.unwrap_or(defaults.liquidity_portion);
        if liquidity_portion.is_sign_negative() || liquidity_portion >= Decimal::ONE {
            return Err(ConfigError::LiquidityPortionOutOfRange(liquidity_portion));
        }

        Ok(Self {
            liquidity_portion,
            significant_digits: raw.significant_digits.unwrap_or(defaults.significant_digits),
            shares_precision: raw.shares_precision.unwrap_or(defaults.shares_precision),
            coins: raw.coins.map(index_coins).unwrap_or(defaults.coins),
        })
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Registry entry for `denom`, or a bare fallback with exponent 0.
    pub fn coin_config(&self, denom: &str) -> CoinConfig {
        self.coins
            .get(denom)
            .cloned()
            .unwrap_or_else(|| CoinConfig::unknown(denom))
    }

    /// Register (or replace) a denom.
    pub fn with_coin(mut self, denom: &str, symbol: &str, exponent: u8) -> Self {
        self.coins
            .insert(denom.to_owned(), CoinConfig::new(denom, symbol, exponent));
        self
    }

    /// Override the liquidity portion.
    pub fn with_liquidity_portion(mut self, portion: Decimal) -> Self {
        self.liquidity_portion = portion;
        self
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.liquidity_portion, dec!(0.1));
        assert_eq!(config.significant_digits, 5);
        assert_eq!(config.shares_precision, 3);
        assert_eq!(config.coin_config("untrn").symbol, "NTRN");
        assert_eq!(config.coin_config(USDC_DENOM).exponent, 6);
    }

    #[test]
    fn test_unknown_denom_fallback() {
        let coin = EngineConfig::default().coin_config("uxyz");
        assert_eq!(coin.symbol, "uxyz");
        assert_eq!(coin.exponent, 0);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config.liquidity_portion, DEFAULT_LIQUIDITY_PORTION);
        assert_eq!(config.coin_config("untrn").exponent, 6);
    }

    #[test]
    fn test_toml_overrides() {
        let text = r#"
            liquidity_portion = "0.25"
            shares_precision = 2

            [[coins]]
            denom = "usat"
            symbol = "SAT"
            exponent = 8
        "#;
        let config = EngineConfig::from_toml_str(text).unwrap();
        assert_eq!(config.liquidity_portion, dec!(0.25));
        assert_eq!(config.shares_precision, 2);
        assert_eq!(config.significant_digits, DEFAULT_SIGNIFICANT_DIGITS);
        assert_eq!(config.coin_config("usat").exponent, 8);
        // custom registry replaces the defaults
        assert_eq!(config.coin_config("untrn").exponent, 0);
    }

    #[test]
    fn test_liquidity_portion_out_of_range() {
        let err = EngineConfig::from_toml_str(r#"liquidity_portion = "1""#).unwrap_err();
        assert!(matches!(err, ConfigError::LiquidityPortionOutOfRange(_)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(EngineConfig::from_toml_str("bogus = 1").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = EngineConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
