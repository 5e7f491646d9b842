//! Catalog categories.

use serde::{Deserialize, Serialize};

use super::id::CategoryId;

/// A catalog category.
///
/// Category IDs are not guaranteed to match across cities; the slug is the
/// stable key when comparing two stores' category trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Depth in the category tree, 1 for top-level.
    pub level: u32,
    pub slug: String,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
}
