//! Command implementations.

mod matching;
mod stores;

use crosscity_client::{ApiError, ClientConfig, ConfigError};
use crosscity_matcher::{MatchError, MatcherConfig, OutputError};
use thiserror::Error;

pub use matching::{MatchOptions, run_match};
pub use stores::list_stores;

use crate::CityArgs;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Load client and matcher configuration, then apply the city flags.
fn load_config(cities: &CityArgs) -> Result<(ClientConfig, MatcherConfig), CommandError> {
    let client = ClientConfig::from_env()?;
    let mut matcher = MatcherConfig::from_env()?;

    if let Some(city) = &cities.city_a {
        matcher.city_a.clone_from(city);
    }
    if let Some(city) = &cities.city_b {
        matcher.city_b.clone_from(city);
    }
    if cities.any_market {
        matcher.market_type = None;
    } else if let Some(market_type) = &cities.market_type {
        matcher.market_type = Some(market_type.clone());
    }

    Ok((client, matcher))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_flags_override_config() {
        let args = CityArgs {
            city_a: Some("Казань".to_string()),
            city_b: None,
            market_type: None,
            any_market: true,
        };

        let (_, matcher) = load_config(&args).expect("config");
        assert_eq!(matcher.city_a, "Казань");
        assert_eq!(matcher.market_type, None);
    }
}
