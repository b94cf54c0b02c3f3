//! AMM Preview - Binary Entry Point
//!
//! Previews trades against a market snapshot saved from the ledger:
//!
//! ```bash
//! amm-preview buy --market market.json --outcome 0 --amount 12.5
//! amm-preview buy --market market.json --outcome 1 --amount 20 --usd-price 0.45
//! amm-preview sell --market market.json --outcome 0 --shares 30
//! amm-preview provide --market market.json --amount 100
//! amm-preview odds --market market.json
//! amm-preview status --market market.json --now 1700000000000000000
//! amm-preview status --market market.json --positions positions.json
//! ```
//!
//! Set `RUST_LOG=amm_preview=debug` (or pass `--verbose`) to trace the
//! simulator stages.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::info;
use tracing_subscriber::EnvFilter;

use amm_preview::types::{Nanoseconds, UsdKind};
use amm_preview::{
    simulate_provide, simulate_purchase, simulate_sale, EngineConfig, Market, OutcomeId, Positions,
    Usd,
};

#[derive(Parser)]
#[command(name = "amm-preview")]
#[command(about = "Preview prediction-market trades without submitting them", long_about = None)]
#[command(version)]
struct Cli {
    /// Engine configuration (TOML); defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log simulator stages
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Preview buying shares of one outcome
    Buy {
        /// Market snapshot (ledger JSON)
        #[arg(short, long)]
        market: PathBuf,

        /// Outcome id
        #[arg(short, long)]
        outcome: u8,

        /// Collateral to deposit, or dollars when --usd-price is set
        #[arg(short, long)]
        amount: String,

        /// USD price of one whole coin
        #[arg(long)]
        usd_price: Option<Decimal>,
    },

    /// Preview selling shares of one outcome
    Sell {
        #[arg(short, long)]
        market: PathBuf,

        #[arg(short, long)]
        outcome: u8,

        /// Shares to sell
        #[arg(short, long)]
        shares: String,
    },

    /// Preview providing liquidity
    Provide {
        #[arg(short, long)]
        market: PathBuf,

        /// Collateral to provide
        #[arg(short, long)]
        amount: String,
    },

    /// Show current odds
    Odds {
        #[arg(short, long)]
        market: PathBuf,
    },

    /// Show the market phase
    Status {
        #[arg(short, long)]
        market: PathBuf,

        /// Timestamp in nanoseconds (defaults to now)
        #[arg(long)]
        now: Option<u64>,

        /// Account positions (ledger JSON) to report holdings for
        #[arg(short, long)]
        positions: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("amm_preview=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_market(path: &Path, config: &EngineConfig) -> Result<Market> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read market snapshot {}", path.display()))?;
    let market = Market::from_json(&json, config)
        .with_context(|| format!("invalid market snapshot {}", path.display()))?;
    info!(market = %market.id(), title = market.title(), "loaded market");
    Ok(market)
}

fn load_positions(path: &Path, market: &Market) -> Result<Positions> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read positions {}", path.display()))?;
    Positions::from_json(&json, market)
        .with_context(|| format!("invalid positions {}", path.display()))
}

fn percent(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(3, RoundingStrategy::ToZero)
}

fn outcome_id(market: &Market, outcome: u8) -> Result<OutcomeId> {
    let id = OutcomeId(outcome);
    if market.get_outcome(id).is_none() {
        bail!(
            "market {} has no outcome {} (valid: 0..{})",
            market.id(),
            outcome,
            market.outcomes().len()
        );
    }
    Ok(id)
}

fn now() -> Nanoseconds {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    Nanoseconds(u64::try_from(nanos).unwrap_or(u64::MAX))
}

fn print_header(market: &Market) {
    println!("===========================================");
    println!("  Market {}: {}", market.id(), market.title());
    println!("===========================================");
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Buy {
            market,
            outcome,
            amount,
            usd_price,
        } => {
            let market = load_market(&market, &config)?;
            let id = outcome_id(&market, outcome)?;
            let coins = match usd_price {
                Some(price) => {
                    if price <= Decimal::ZERO {
                        bail!("USD price must be positive, got {price}");
                    }
                    let dollars = Usd::parse(UsdKind, &amount)
                        .with_context(|| format!("invalid USD amount {amount:?}"))?;
                    dollars.to_coins(market.collateral().clone(), price)
                }
                None => market
                    .parse_coins(&amount)
                    .with_context(|| format!("invalid amount {amount:?}"))?,
            };

            let result = simulate_purchase(&market, id, &coins);
            print_header(&market);
            println!("Buy {} with {}", market.outcome(id).label, coins);
            println!("  Shares:    {}", result.shares);
            println!("  Fees:      {}", result.fees);
            println!("  Liquidity: {}", result.liquidity);
            match &result.price {
                Some(price) => println!("  Price:     {} per share", price),
                None => println!("  Price:     -"),
            }
            println!(
                "  Payout if {} wins: {}",
                market.outcome(id).label,
                market.potential_winnings(&result.shares)
            );
        }

        Commands::Sell {
            market,
            outcome,
            shares,
        } => {
            let market = load_market(&market, &config)?;
            let id = outcome_id(&market, outcome)?;
            let shares = market
                .parse_shares(&shares)
                .with_context(|| format!("invalid share amount {shares:?}"))?;

            let result = simulate_sale(&market, id, &shares);
            print_header(&market);
            println!("Sell {} of {}", shares, market.outcome(id).label);
            println!("  Coins:     {}", result.coins);
            println!("  Fees:      {}", result.fees);
            println!("  Liquidity: {}", result.liquidity);
            match &result.price {
                Some(price) => println!("  Price:     {} per share", price),
                None => println!("  Price:     -"),
            }
        }

        Commands::Provide { market, amount } => {
            let market = load_market(&market, &config)?;
            let coins = market
                .parse_coins(&amount)
                .with_context(|| format!("invalid amount {amount:?}"))?;

            let result = simulate_provide(&market, &coins);
            print_header(&market);
            println!("Provide {}", coins);
            println!("  LP shares: {}", result.lp_shares);
            println!("  Pool share: {}%", percent(result.pool_portion));
            for (outcome, (added, returned)) in market
                .outcomes()
                .iter()
                .zip(result.added.iter().zip(&result.returned))
            {
                println!(
                    "  {:<12} pool +{}, returned {}",
                    outcome.label, added, returned
                );
            }
        }

        Commands::Odds { market } => {
            let market = load_market(&market, &config)?;
            print_header(&market);
            for odds in market.outcome_odds() {
                let outcome = market.outcome(odds.outcome);
                println!(
                    "  {:<12} {:>8}%  {} per share",
                    outcome.label,
                    odds.percentage
                        .round_dp_with_strategy(2, RoundingStrategy::ToZero),
                    odds.price
                );
            }
        }

        Commands::Status {
            market,
            now: at,
            positions,
        } => {
            let market = load_market(&market, &config)?;
            let positions = positions
                .map(|path| load_positions(&path, &market))
                .transpose()?;
            let at = at.map(Nanoseconds).unwrap_or_else(now);
            print_header(&market);
            println!("  Status:    {}", market.status(at));
            println!("  Pool:      {}", market.pool_size());
            println!("  Wallets:   {}", market.total_wallets());
            println!("  LP wallets: {}", market.lp_wallets());

            if let Some(positions) = positions {
                println!("Holdings");
                for outcome in market.outcomes() {
                    let shares = positions.shares(&market, outcome.id);
                    println!(
                        "  {:<12} {}, pays {}",
                        outcome.label,
                        shares,
                        market.potential_winnings(&shares)
                    );
                }
                println!(
                    "  You own {}% of the liquidity pool",
                    percent(market.pool_portion(positions.lp_shares()))
                );
            }
        }
    }

    Ok(())
}
