//! Result writers.

use std::path::{Path, PathBuf};

use crosscity_core::MatchedProduct;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use thiserror::Error;
use tracing::info;

/// Default output file name.
pub const DEFAULT_OUTPUT: &str = "crosscity_products.json";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Destination for a run's matched products.
pub trait ResultWriter {
    /// Persist `products`, replacing any earlier output.
    ///
    /// # Errors
    ///
    /// Returns `OutputError` if serialization or the write fails.
    fn write(&self, products: &[MatchedProduct]) -> Result<(), OutputError>;
}

/// Writes results as a pretty-printed JSON array.
///
/// Indented by four spaces; non-ASCII text is written as-is.
#[derive(Debug, Clone)]
pub struct JsonFileWriter {
    path: PathBuf,
}

impl JsonFileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for JsonFileWriter {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT)
    }
}

impl ResultWriter for JsonFileWriter {
    fn write(&self, products: &[MatchedProduct]) -> Result<(), OutputError> {
        let json = to_pretty_json(products)?;
        std::fs::write(&self.path, json).map_err(|source| OutputError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), count = products.len(), "results written");
        Ok(())
    }
}

fn to_pretty_json(products: &[MatchedProduct]) -> Result<Vec<u8>, OutputError> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    products.serialize(&mut serializer)?;
    Ok(buf)
}
