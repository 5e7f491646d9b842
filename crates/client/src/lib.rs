//! Crosscity Client - Signed HTTP client for the retail catalog backend.
//!
//! # Architecture
//!
//! - Two base URLs: the "site" endpoint (session bootstrap, JSON-RPC store
//!   selection) and the "catalog" endpoint (stores, categories, items)
//! - Every request carries a fresh time-based signature (see [`signature`])
//! - A session token is fetched lazily on the first authenticated call and
//!   cached in memory for the lifetime of the client
//! - The client never retries; callers wrap operations in a
//!   [`retry::RetryPolicy`] where retrying makes sense
//!
//! The [`CatalogApi`] trait is the seam the matcher programs against, so the
//! HTTP client can be swapped for an in-memory fake in tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod retry;
pub mod session;
pub mod signature;

pub use api::CatalogApi;
pub use client::CatalogClient;
pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
pub use headers::{Credentials, SignedRequest};
pub use retry::{RetryError, RetryPolicy, Retryable};
pub use session::SessionToken;
pub use signature::{Signature, sign, strip_query};
