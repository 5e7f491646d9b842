//! Session bootstrap.
//!
//! The site endpoint hands out a session token in exchange for the device
//! identity. The token is sent as the `SessionToken` header on every
//! subsequent call.

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::ApiError;
use crate::headers::{Credentials, SignedRequest};

/// Path of the session bootstrap call on the site endpoint.
pub const SESSION_PATH: &str = "/api/rest/siteSettingsGet";

/// Session token obtained from the site endpoint.
#[derive(Debug, Clone)]
pub struct SessionToken(SecretString);

impl SessionToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The raw token, for the `SessionToken` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// `request` query parameter of the bootstrap call.
#[derive(Serialize)]
struct BootstrapRequest<'a> {
    #[serde(rename = "Head")]
    head: BootstrapHead<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct BootstrapHead<'a> {
    method: &'a str,
    request_id: &'a str,
    device_id: &'a str,
    client: &'a str,
    marketing_partner_key: &'a str,
}

#[derive(Deserialize)]
struct BootstrapResponse {
    #[serde(rename = "Head", default)]
    head: Option<BootstrapResponseHead>,
}

#[derive(Deserialize)]
struct BootstrapResponseHead {
    #[serde(rename = "SessionToken", default)]
    session_token: Option<String>,
}

/// Request a new session token.
///
/// This call is signed but carries no `SessionToken` header.
///
/// # Errors
///
/// Returns `ApiError::Status` on a non-2xx response and
/// `ApiError::Authentication` if the response has no session token.
#[instrument(skip(http, credentials), fields(device_id = %credentials.device_id))]
pub async fn bootstrap(
    http: &reqwest::Client,
    site_url: &str,
    credentials: &Credentials,
) -> Result<SessionToken, ApiError> {
    let url = format!("{site_url}{SESSION_PATH}");

    let payload = BootstrapRequest {
        head: BootstrapHead {
            method: "siteSettingsGet",
            request_id: &credentials.request_id,
            device_id: &credentials.device_id,
            client: &credentials.client_version,
            marketing_partner_key: credentials.marketing_partner_key.expose_secret(),
        },
    };
    let payload =
        serde_json::to_string(&payload).map_err(|e| ApiError::Parse(e.to_string()))?;
    let request_url = url::Url::parse_with_params(&url, &[("request", payload.as_str())])
        .map_err(|e| ApiError::Parse(format!("Invalid session URL: {e}")))?;

    let headers = SignedRequest::new(credentials, None, &url, Utc::now()).headers()?;
    debug!(url = %request_url, "requesting session token");

    let response = http.get(request_url).headers(headers).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let parsed: BootstrapResponse = serde_json::from_str(&body)
        .map_err(|e| ApiError::Parse(format!("Failed to parse session response: {e}")))?;

    parsed
        .head
        .and_then(|head| head.session_token)
        .filter(|token| !token.is_empty())
        .map(SessionToken::new)
        .ok_or_else(|| ApiError::Authentication("SessionToken missing from response".to_string()))
}
