//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional; defaults match the Android app release the signing salt was
//! taken from.
//!
//! - `CROSSCITY_SITE_URL` - Site endpoint (default: `https://lentochka.lenta.com`)
//! - `CROSSCITY_CATALOG_URL` - Catalog endpoint (default: `https://api.lenta.com`)
//! - `CROSSCITY_CLIENT_VERSION` - `Client` header (default: `android_14_6.25.2`)
//! - `CROSSCITY_APP_VERSION` - `App-Version` header (default: `6.25.2`)
//! - `CROSSCITY_PARTNER_KEY` - Marketing partner key
//! - `CROSSCITY_SIGNING_SALT` - Salt mixed into every request signature
//! - `CROSSCITY_USER_AGENT` - `User-Agent` header (default: `okhttp/4.9.1`)
//! - `CROSSCITY_PLATFORM` - `X-Platform` header (default: `omniapp`)
//! - `CROSSCITY_RETAIL_BRAND` - `x-retail-brand` header (default: `lo`)

use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

pub const DEFAULT_SITE_URL: &str = "https://lentochka.lenta.com";
pub const DEFAULT_CATALOG_URL: &str = "https://api.lenta.com";
pub const DEFAULT_CLIENT_VERSION: &str = "android_14_6.25.2";
pub const DEFAULT_APP_VERSION: &str = "6.25.2";
const DEFAULT_PARTNER_KEY: &str = "mp402-8a74f99040079ea25d64d14b5212b0e3";
const DEFAULT_SIGNING_SALT: &str = "b4fad1ebab4532185b653330d593b472";
const DEFAULT_USER_AGENT: &str = "okhttp/4.9.1";
const DEFAULT_PLATFORM: &str = "omniapp";
const DEFAULT_RETAIL_BRAND: &str = "lo";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Catalog client configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the site endpoint (no trailing slash)
    pub site_url: String,
    /// Base URL of the catalog endpoint (no trailing slash)
    pub catalog_url: String,
    pub client_version: String,
    pub app_version: String,
    pub marketing_partner_key: SecretString,
    /// Salt prepended to the URL and timestamp before hashing
    pub signing_salt: SecretString,
    pub user_agent: String,
    pub platform: String,
    pub retail_brand: String,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("site_url", &self.site_url)
            .field("catalog_url", &self.catalog_url)
            .field("client_version", &self.client_version)
            .field("app_version", &self.app_version)
            .field("marketing_partner_key", &"[REDACTED]")
            .field("signing_salt", &"[REDACTED]")
            .field("user_agent", &self.user_agent)
            .field("platform", &self.platform)
            .field("retail_brand", &self.retail_brand)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            site_url: DEFAULT_SITE_URL.to_string(),
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            client_version: DEFAULT_CLIENT_VERSION.to_string(),
            app_version: DEFAULT_APP_VERSION.to_string(),
            marketing_partner_key: SecretString::from(DEFAULT_PARTNER_KEY),
            signing_salt: SecretString::from(DEFAULT_SIGNING_SALT),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            platform: DEFAULT_PLATFORM.to_string(),
            retail_brand: DEFAULT_RETAIL_BRAND.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a base URL is not a valid absolute URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let site_url = get_url_env("CROSSCITY_SITE_URL", DEFAULT_SITE_URL)?;
        let catalog_url = get_url_env("CROSSCITY_CATALOG_URL", DEFAULT_CATALOG_URL)?;

        Ok(Self {
            site_url,
            catalog_url,
            client_version: get_env_or_default("CROSSCITY_CLIENT_VERSION", DEFAULT_CLIENT_VERSION),
            app_version: get_env_or_default("CROSSCITY_APP_VERSION", DEFAULT_APP_VERSION),
            marketing_partner_key: SecretString::from(get_env_or_default(
                "CROSSCITY_PARTNER_KEY",
                DEFAULT_PARTNER_KEY,
            )),
            signing_salt: SecretString::from(get_env_or_default(
                "CROSSCITY_SIGNING_SALT",
                DEFAULT_SIGNING_SALT,
            )),
            user_agent: get_env_or_default("CROSSCITY_USER_AGENT", DEFAULT_USER_AGENT),
            platform: get_env_or_default("CROSSCITY_PLATFORM", DEFAULT_PLATFORM),
            retail_brand: get_env_or_default("CROSSCITY_RETAIL_BRAND", DEFAULT_RETAIL_BRAND),
        })
    }

    /// Point both endpoints at the same base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        self.site_url.clone_from(&base);
        self.catalog_url = base;
        self
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an environment variable with a default value.
#[must_use]
pub fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to a default when unset.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if the variable is set but does not
/// parse.
pub fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Get a base URL, validating it and stripping any trailing slash.
fn get_url_env(key: &str, default: &str) -> Result<String, ConfigError> {
    let raw = get_env_or_default(key, default);
    url::Url::parse(&raw)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    Ok(raw.trim_end_matches('/').to_string())
}
