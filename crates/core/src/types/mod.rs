//! Core types for crosscity.
//!
//! This module provides type-safe wrappers for catalog domain concepts.

pub mod category;
pub mod id;
pub mod item;
pub mod price;
pub mod product;
pub mod store;

pub use category::Category;
pub use id::*;
pub use item::{CatalogItem, CatalogPage, ItemAttribute, ItemDetail, ItemFeatures, ItemPrices};
pub use price::MinorUnits;
pub use product::{Brand, MatchedProduct};
pub use store::{HYPERMARKET, Store, StoreList};
