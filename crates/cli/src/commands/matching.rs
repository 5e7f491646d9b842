//! The `match` command.
//!
//! # Environment Variables
//!
//! - `CROSSCITY_OUTPUT` - Output file (default: `crosscity_products.json`)
//!
//! See `crosscity_client::config` and `crosscity_matcher::config` for the rest.

use std::path::PathBuf;

use crosscity_client::CatalogClient;
use crosscity_client::config::get_env_or_default;
use crosscity_matcher::output::DEFAULT_OUTPUT;
use crosscity_matcher::{
    JsonFileWriter, MatchError, Matcher, Pacing, ResultWriter, StorePick, Strategy,
};
use tracing::{info, warn};

use super::{CommandError, load_config};
use crate::CityArgs;

/// Flags of the `match` command beyond the city overrides.
#[derive(Debug, Default)]
pub struct MatchOptions {
    pub strategy: Option<Strategy>,
    pub output: Option<PathBuf>,
    pub store_pick: Option<StorePick>,
    pub no_pacing: bool,
}

/// Run one discovery, match and write cycle.
///
/// A city without qualifying stores is reported as a warning and produces an
/// empty result file.
///
/// # Errors
///
/// Returns an error if configuration is invalid, a catalog call fails or the
/// output cannot be written.
pub async fn run_match(cities: &CityArgs, options: MatchOptions) -> Result<(), CommandError> {
    let (client_config, mut config) = load_config(cities)?;

    if let Some(strategy) = options.strategy {
        config.strategy = strategy;
    }
    if let Some(store_pick) = options.store_pick {
        config.store_pick = store_pick;
    }
    if options.no_pacing {
        config.pacing = Pacing::none();
    }

    let output = options
        .output
        .unwrap_or_else(|| PathBuf::from(get_env_or_default("CROSSCITY_OUTPUT", DEFAULT_OUTPUT)));
    let writer = JsonFileWriter::new(output);

    info!(
        city_a = %config.city_a,
        city_b = %config.city_b,
        strategy = %config.strategy,
        "starting match"
    );

    let client = CatalogClient::new(client_config)?;
    let mut matcher = Matcher::new(client, config);

    let products = match matcher.run().await {
        Ok(products) => products,
        Err(MatchError::NoStores { city }) => {
            warn!(%city, "no qualifying stores, writing empty result");
            Vec::new()
        }
        Err(e) => return Err(e.into()),
    };

    writer.write(&products)?;
    info!(
        count = products.len(),
        path = %writer.path().display(),
        "match complete"
    );
    Ok(())
}
