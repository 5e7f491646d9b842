//! Request signature (`Qrator-Token`).
//!
//! The token is the lowercase hex MD5 of `salt + url + timestamp`, where `url`
//! has its query string removed and `timestamp` is the Unix time in seconds.
//! The backend rejects tokens whose timestamp drifts from the `Timestamp`
//! header, so a signature is only valid for the request it was computed for.

use md5::{Digest, Md5};

/// A computed request signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Lowercase hex digest, 32 chars.
    pub token: String,
    /// The signed Unix timestamp in seconds, as sent in the `Timestamp` header.
    pub timestamp: String,
}

/// Everything before the first `?`.
#[must_use]
pub fn strip_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

/// Sign a URL at the given Unix timestamp (seconds).
#[must_use]
pub fn sign(salt: &str, url: &str, timestamp: i64) -> Signature {
    let timestamp = timestamp.to_string();

    let mut hasher = Md5::new();
    hasher.update(salt.as_bytes());
    hasher.update(strip_query(url).as_bytes());
    hasher.update(timestamp.as_bytes());

    Signature {
        token: hex::encode(hasher.finalize()),
        timestamp,
    }
}
