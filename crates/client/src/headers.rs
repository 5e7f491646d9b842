//! Per-request header construction.
//!
//! Headers are built from scratch for every request out of the client's
//! [`Credentials`], the current session token, the target URL and a clock
//! reading. Nothing is carried over between requests.

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use secrecy::{ExposeSecret, SecretString};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::SessionToken;
use crate::signature::{Signature, sign};

/// Identity the client presents to the backend.
///
/// The device and request identifiers are generated once per client.
#[derive(Clone)]
pub struct Credentials {
    pub device_id: String,
    pub request_id: String,
    pub client_version: String,
    pub app_version: String,
    pub marketing_partner_key: SecretString,
    pub signing_salt: SecretString,
    pub user_agent: String,
    pub platform: String,
    pub retail_brand: String,
}

impl Credentials {
    /// Generate fresh device and request identifiers for a client.
    #[must_use]
    pub fn generate(config: &ClientConfig) -> Self {
        Self {
            device_id: format!("A-{}", uuid::Uuid::new_v4()),
            request_id: uuid::Uuid::new_v4().simple().to_string(),
            client_version: config.client_version.clone(),
            app_version: config.app_version.clone(),
            marketing_partner_key: config.marketing_partner_key.clone(),
            signing_salt: config.signing_salt.clone(),
            user_agent: config.user_agent.clone(),
            platform: config.platform.clone(),
            retail_brand: config.retail_brand.clone(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("device_id", &self.device_id)
            .field("request_id", &self.request_id)
            .field("client_version", &self.client_version)
            .finish_non_exhaustive()
    }
}

/// A request about to be sent: who is sending it, where, and when.
#[derive(Debug)]
pub struct SignedRequest<'a> {
    credentials: &'a Credentials,
    session: Option<&'a SessionToken>,
    url: &'a str,
    now: DateTime<Utc>,
}

impl<'a> SignedRequest<'a> {
    #[must_use]
    pub const fn new(
        credentials: &'a Credentials,
        session: Option<&'a SessionToken>,
        url: &'a str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            credentials,
            session,
            url,
            now,
        }
    }

    /// Signature over the URL at this request's clock reading.
    #[must_use]
    pub fn signature(&self) -> Signature {
        sign(
            self.credentials.signing_salt.expose_secret(),
            self.url,
            self.now.timestamp(),
        )
    }

    /// `LocalTime` header value: UTC, second precision.
    #[must_use]
    pub fn local_time(&self) -> String {
        self.now.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    /// Build the full header set for this request.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidHeader` if a configured value contains
    /// characters not allowed in an HTTP header.
    pub fn headers(&self) -> Result<HeaderMap, ApiError> {
        let signature = self.signature();
        let credentials = self.credentials;

        let mut headers = HeaderMap::new();
        insert(&mut headers, "client", &credentials.client_version)?;
        insert(&mut headers, "app-version", &credentials.app_version)?;
        insert(&mut headers, "deviceid", &credentials.device_id)?;
        insert(
            &mut headers,
            "marketingpartnerkey",
            credentials.marketing_partner_key.expose_secret(),
        )?;
        insert(&mut headers, "x-platform", &credentials.platform)?;
        insert(&mut headers, "x-retail-brand", &credentials.retail_brand)?;
        insert(&mut headers, "qrator-token", &signature.token)?;
        insert(&mut headers, "timestamp", &signature.timestamp)?;
        insert(&mut headers, "localtime", &self.local_time())?;
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&credentials.user_agent)
                .map_err(|_| ApiError::InvalidHeader("User-Agent".to_string()))?,
        );

        if let Some(session) = self.session {
            let mut value = HeaderValue::from_str(session.expose())
                .map_err(|_| ApiError::InvalidHeader("SessionToken".to_string()))?;
            value.set_sensitive(true);
            headers.insert(HeaderName::from_static("sessiontoken"), value);
        }

        Ok(headers)
    }
}

/// Header names are given lowercase, as `HeaderName::from_static` requires.
fn insert(headers: &mut HeaderMap, name: &'static str, value: &str) -> Result<(), ApiError> {
    let value =
        HeaderValue::from_str(value).map_err(|_| ApiError::InvalidHeader(name.to_string()))?;
    headers.insert(HeaderName::from_static(name), value);
    Ok(())
}
