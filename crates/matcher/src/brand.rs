//! Brand resolution for matched products.
//!
//! The catalog listing does not reliably carry the brand, so each matched item
//! is looked up individually. Lookups are the most frequent call of a run and
//! the first to hit the backend's rate limit, hence the retry policy.

use crosscity_client::{CatalogApi, RetryError, RetryPolicy};
use crosscity_core::{Brand, CatalogItem, ItemAttribute, ItemDetail, ItemId, MatchedProduct};
use tracing::{debug, info, warn};

/// Russian display name of the brand attribute.
const BRAND_ATTRIBUTE_NAME: &str = "Бренд";
const BRAND_ATTRIBUTE_KEY: &str = "brand";

fn is_brand_attribute(attribute: &ItemAttribute) -> bool {
    attribute.alias.as_deref() == Some(BRAND_ATTRIBUTE_KEY)
        || attribute.name.as_deref() == Some(BRAND_ATTRIBUTE_NAME)
        || attribute.slug.as_deref() == Some(BRAND_ATTRIBUTE_KEY)
}

/// Brand from an item's attributes.
///
/// The first brand attribute wins. An item without one, or whose brand value
/// is empty, is [`Brand::Unbranded`].
#[must_use]
pub fn find_brand(detail: &ItemDetail) -> Brand {
    detail
        .attributes
        .iter()
        .find(|attribute| is_brand_attribute(attribute))
        .and_then(ItemAttribute::value_text)
        .filter(|value| !value.trim().is_empty())
        .map_or(Brand::Unbranded, Brand::Named)
}

/// Looks up brands through the catalog, retrying transient failures.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrandResolver {
    policy: RetryPolicy,
}

impl BrandResolver {
    #[must_use]
    pub const fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Brand of one item.
    ///
    /// Never fails: once the retry policy gives up, the item is reported as
    /// [`Brand::Unknown`].
    pub async fn resolve<A: CatalogApi>(&self, api: &A, item_id: ItemId) -> Brand {
        match self.policy.run(|| api.catalog_item(item_id)).await {
            Ok(detail) => find_brand(&detail),
            Err(RetryError::Exhausted { attempts, source }) => {
                warn!(%item_id, attempts, error = %source, "brand lookup exhausted retries");
                Brand::Unknown
            }
            Err(RetryError::Permanent { attempts, source }) => {
                warn!(%item_id, attempts, error = %source, "brand lookup failed");
                Brand::Unknown
            }
        }
    }

    /// Resolve brands for `items` sequentially and build the output records.
    pub async fn enrich<A: CatalogApi>(
        &self,
        api: &A,
        items: &[&CatalogItem],
    ) -> Vec<MatchedProduct> {
        let mut products = Vec::with_capacity(items.len());
        for item in items {
            let brand = self.resolve(api, item.id).await;
            debug!(id = %item.id, name = %item.name, %brand, "product added");
            products.push(MatchedProduct::from_item(item, brand));
        }
        info!(count = products.len(), "brands resolved");
        products
    }
}
