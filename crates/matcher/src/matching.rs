//! The cross-city matching rule.

use std::collections::HashSet;

use crosscity_core::{CatalogItem, ItemId};

/// Items of `first` that are also listed in `second`, both copies available.
///
/// An item qualifies when its id appears on both sides and it is in stock and
/// not blocked for sale on both sides. Order follows `first`; an id listed
/// twice in `first` is returned once.
#[must_use]
pub fn in_stock_matches<'a>(
    first: &'a [CatalogItem],
    second: &[CatalogItem],
) -> Vec<&'a CatalogItem> {
    let available: HashSet<ItemId> = second
        .iter()
        .filter(|item| item.is_available())
        .map(|item| item.id)
        .collect();

    let mut seen = HashSet::new();
    first
        .iter()
        .filter(|item| item.is_available() && available.contains(&item.id))
        .filter(|item| seen.insert(item.id))
        .collect()
}

/// Whether a count reaches the configured minimum.
#[must_use]
pub const fn meets_minimum(count: usize, minimum: usize) -> bool {
    count >= minimum
}
