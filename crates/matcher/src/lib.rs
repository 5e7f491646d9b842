//! Crosscity Matcher - Cross-city category search and product matching.
//!
//! Given two cities, the matcher finds a top-level category that has at least
//! 100 items in a store of each city and at least 100 products that are in
//! stock and sellable in both, then resolves each product's brand.
//!
//! # Modules
//!
//! - [`stores`] - Store discovery per city
//! - [`matching`] - The in-stock intersection rule
//! - [`brand`] - Brand lookup with retry and backoff
//! - [`search`] - The [`Matcher`] and its two search strategies
//! - [`output`] - Result writers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod brand;
pub mod config;
pub mod error;
pub mod matching;
pub mod output;
pub mod search;
pub mod stores;

#[cfg(test)]
mod testing;

pub use brand::BrandResolver;
pub use config::{MatcherConfig, Pacing, StorePick, Strategy};
pub use error::MatchError;
pub use output::{JsonFileWriter, OutputError, ResultWriter};
pub use search::Matcher;
pub use stores::CityStores;
