//! Matcher error types.

use crosscity_client::ApiError;
use thiserror::Error;

use crate::output::OutputError;

/// Errors that abort a matcher run.
#[derive(Debug, Error)]
pub enum MatchError {
    /// A catalog call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Store discovery found nothing in one of the target cities.
    #[error("No qualifying store found in {city}")]
    NoStores { city: String },

    /// Writing results failed.
    #[error("Output error: {0}")]
    Output(#[from] OutputError),
}
