//! Crosscity Core - Shared catalog types.
//!
//! This crate provides the domain types used across all crosscity components:
//! - `client` - Signed HTTP client for the retail backend
//! - `matcher` - Cross-city category search and product matching
//! - `cli` - Process entry point
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Wire shapes
//! are expressed with serde attributes so the client can deserialize
//! responses straight into these types.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, stores, categories, catalog items and
//!   matched product records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
