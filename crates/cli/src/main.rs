//! Crosscity CLI - Finds products stocked in stores of two cities.
//!
//! # Usage
//!
//! ```bash
//! # Match products between the default cities and write crosscity_products.json
//! crosscity match
//!
//! # Try every store pair, any store format
//! crosscity match --strategy exhaustive --any-market
//!
//! # List qualifying stores per city
//! crosscity stores --city-b Казань
//! ```
//!
//! # Commands
//!
//! - `match` - Run one discovery, match and write cycle
//! - `stores` - List the stores each city would search
//!
//! Defaults come from `CROSSCITY_*` environment variables (a `.env` file is
//! honoured); flags override them.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use crosscity_matcher::{StorePick, Strategy};

mod commands;

#[derive(Parser)]
#[command(name = "crosscity")]
#[command(author, version, about = "Cross-city product matcher")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find a shared category and write the matched products
    Match {
        #[command(flatten)]
        cities: CityArgs,

        /// Search strategy (`single-pass`, `exhaustive`)
        #[arg(short, long)]
        strategy: Option<Strategy>,

        /// Output file (default: `CROSSCITY_OUTPUT` or crosscity_products.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Use each city's first store instead of a random one
        #[arg(long)]
        first_store: bool,

        /// Disable the pauses between store and city switches
        #[arg(long)]
        no_pacing: bool,
    },
    /// List the qualifying stores of each city
    Stores {
        #[command(flatten)]
        cities: CityArgs,
    },
}

/// City and store-format overrides shared by all commands.
#[derive(Args, Debug, Default)]
struct CityArgs {
    /// First city, as it appears in store addresses
    #[arg(long)]
    city_a: Option<String>,

    /// Second city
    #[arg(long)]
    city_b: Option<String>,

    /// Only use stores of this market type (e.g. `HM`)
    #[arg(long, conflicts_with = "any_market")]
    market_type: Option<String>,

    /// Accept stores of any market type
    #[arg(long)]
    any_market: bool,
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "crosscity=info,crosscity_client=info,crosscity_matcher=info".into()
    });
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Match {
            cities,
            strategy,
            output,
            first_store,
            no_pacing,
        } => {
            let options = commands::MatchOptions {
                strategy,
                output,
                store_pick: first_store.then_some(StorePick::First),
                no_pacing,
            };
            commands::run_match(&cities, options).await?;
        }
        Commands::Stores { cities } => commands::list_stores(&cities).await?,
    }
    Ok(())
}
