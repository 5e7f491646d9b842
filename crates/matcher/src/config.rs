//! Matcher configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional.
//!
//! - `CROSSCITY_CITY_A` - First city (default: `Москва`)
//! - `CROSSCITY_CITY_B` - Second city (default: `Санкт-Петербург`)
//! - `CROSSCITY_MARKET_TYPE` - Store format filter (default: `HM`, empty disables)
//! - `CROSSCITY_STRATEGY` - `single-pass` or `exhaustive` (default: `single-pass`)
//! - `CROSSCITY_MIN_COMMON` - Minimum shared products (default: 100)
//! - `CROSSCITY_MIN_CATEGORY_ITEMS` - Minimum category size per city (default: 100)

use std::str::FromStr;
use std::time::Duration;

use crosscity_client::RetryPolicy;
use crosscity_client::config::{ConfigError, get_env_or_default, parse_env_or_default};
use crosscity_core::HYPERMARKET;

pub const DEFAULT_CITY_A: &str = "Москва";
pub const DEFAULT_CITY_B: &str = "Санкт-Петербург";
pub const MIN_COMMON_PRODUCTS: usize = 100;
pub const MIN_CATEGORY_ITEMS: u64 = 100;

/// How the matcher walks stores and categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// One store per city; first common category that qualifies.
    #[default]
    SinglePass,
    /// Every store in the first city against every store in the second.
    Exhaustive,
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single-pass" | "single_pass" | "single" => Ok(Self::SinglePass),
            "exhaustive" => Ok(Self::Exhaustive),
            other => Err(format!(
                "unknown strategy '{other}' (expected single-pass or exhaustive)"
            )),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SinglePass => write!(f, "single-pass"),
            Self::Exhaustive => write!(f, "exhaustive"),
        }
    }
}

/// Which store of a city the single-pass strategy uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorePick {
    #[default]
    Random,
    First,
}

impl FromStr for StorePick {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "first" => Ok(Self::First),
            other => Err(format!("unknown store pick '{other}' (expected random or first)")),
        }
    }
}

/// Pauses inserted to stay under the backend's rate limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// After each change of selected store
    pub store_switch: Duration,
    /// Between fetching a category in the first city and in the second
    pub city_switch: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            store_switch: Duration::from_secs(2),
            city_switch: Duration::from_secs(5),
        }
    }
}

impl Pacing {
    /// No pauses at all.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            store_switch: Duration::ZERO,
            city_switch: Duration::ZERO,
        }
    }
}

/// Matcher configuration.
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    pub city_a: String,
    pub city_b: String,
    /// Only stores with this market type qualify; `None` accepts any.
    pub market_type: Option<String>,
    pub strategy: Strategy,
    pub store_pick: StorePick,
    /// Category depth searched (1 = top level).
    pub category_level: u32,
    pub min_category_items: u64,
    pub min_common_products: usize,
    pub pacing: Pacing,
    /// Retry policy for per-item brand lookups.
    pub brand_retry: RetryPolicy,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            city_a: DEFAULT_CITY_A.to_string(),
            city_b: DEFAULT_CITY_B.to_string(),
            market_type: Some(HYPERMARKET.to_string()),
            strategy: Strategy::default(),
            store_pick: StorePick::default(),
            category_level: 1,
            min_category_items: MIN_CATEGORY_ITEMS,
            min_common_products: MIN_COMMON_PRODUCTS,
            pacing: Pacing::default(),
            brand_retry: RetryPolicy::default(),
        }
    }
}

impl MatcherConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a numeric or enum variable
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let market_type = get_env_or_default("CROSSCITY_MARKET_TYPE", HYPERMARKET);
        let market_type = market_type.trim();
        let market_type = (!market_type.is_empty()).then(|| market_type.to_string());

        Ok(Self {
            city_a: get_env_or_default("CROSSCITY_CITY_A", DEFAULT_CITY_A),
            city_b: get_env_or_default("CROSSCITY_CITY_B", DEFAULT_CITY_B),
            market_type,
            strategy: parse_env_or_default("CROSSCITY_STRATEGY", defaults.strategy)?,
            min_category_items: parse_env_or_default(
                "CROSSCITY_MIN_CATEGORY_ITEMS",
                defaults.min_category_items,
            )?,
            min_common_products: parse_env_or_default(
                "CROSSCITY_MIN_COMMON",
                defaults.min_common_products,
            )?,
            ..defaults
        })
    }

    /// The two target cities, in search order.
    #[must_use]
    pub fn cities(&self) -> [&str; 2] {
        [self.city_a.as_str(), self.city_b.as_str()]
    }
}
