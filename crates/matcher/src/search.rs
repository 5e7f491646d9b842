//! Cross-city category search.
//!
//! The backend scopes category and catalog calls to the store selected last,
//! so the matcher tracks which store is selected and only switches when a
//! call needs a different one. Every switch is followed by the configured
//! store-switch pause.

use std::collections::HashMap;
use std::time::Duration;

use crosscity_client::CatalogApi;
use crosscity_core::{CatalogPage, Category, MatchedProduct, StoreId};
use rand::seq::IndexedRandom;
use tracing::{info, instrument, warn};

use crate::brand::BrandResolver;
use crate::config::{MatcherConfig, StorePick, Strategy};
use crate::error::MatchError;
use crate::matching::{in_stock_matches, meets_minimum};
use crate::stores::{CityStores, discover_stores};

/// Runs one cross-city search against a catalog.
pub struct Matcher<A> {
    api: A,
    config: MatcherConfig,
    brands: BrandResolver,
    selected: Option<StoreId>,
}

impl<A: CatalogApi> Matcher<A> {
    pub fn new(api: A, config: MatcherConfig) -> Self {
        let brands = BrandResolver::new(config.brand_retry);
        Self {
            api,
            config,
            brands,
            selected: None,
        }
    }

    /// Discover stores, search with the configured strategy and resolve
    /// brands.
    ///
    /// Returns an empty list when no category qualifies.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::NoStores` if either city has no qualifying store,
    /// or `MatchError::Api` if a listing or store selection call fails.
    #[instrument(skip(self), fields(strategy = %self.config.strategy))]
    pub async fn run(&mut self) -> Result<Vec<MatchedProduct>, MatchError> {
        let stores = discover_stores(
            &self.api,
            self.config.cities(),
            self.config.market_type.as_deref(),
        )
        .await?;

        match self.config.strategy {
            Strategy::SinglePass => self.single_pass(&stores).await,
            Strategy::Exhaustive => self.exhaustive(&stores).await,
        }
    }

    /// One store per city; the first common category that qualifies wins.
    async fn single_pass(
        &mut self,
        stores: &CityStores,
    ) -> Result<Vec<MatchedProduct>, MatchError> {
        let [city_a, city_b] = self.config.cities();
        let store_a = pick_store(stores.get(city_a), self.config.store_pick).ok_or_else(|| {
            MatchError::NoStores {
                city: city_a.to_string(),
            }
        })?;
        let store_b = pick_store(stores.get(city_b), self.config.store_pick).ok_or_else(|| {
            MatchError::NoStores {
                city: city_b.to_string(),
            }
        })?;
        info!(city = city_a, store_id = %store_a, "using store");
        info!(city = city_b, store_id = %store_b, "using store");

        let categories_a = self.categories_at(store_a).await?;
        let categories_b = self.categories_at(store_b).await?;

        for category_a in &categories_a {
            let Some(category_b) = categories_b.iter().find(|c| c.slug == category_a.slug) else {
                continue;
            };
            info!(slug = %category_a.slug, "searching category");

            let page_a = self.items_at(store_a, category_a).await?;
            pause(self.config.pacing.city_switch).await;
            let page_b = self.items_at(store_b, category_b).await?;

            if !self.category_large_enough(&page_a) || !self.category_large_enough(&page_b) {
                info!(
                    slug = %category_a.slug,
                    total_a = page_a.total,
                    total_b = page_b.total,
                    "not enough items in category"
                );
                continue;
            }

            if let Some(products) = self.try_match(&category_a.slug, &page_a, &page_b).await {
                return Ok(products);
            }
        }

        warn!(
            min_common = self.config.min_common_products,
            "no common category with enough shared in-stock products"
        );
        Ok(Vec::new())
    }

    /// Every store of the first city against every store of the second.
    async fn exhaustive(&mut self, stores: &CityStores) -> Result<Vec<MatchedProduct>, MatchError> {
        let [city_a, city_b] = self.config.cities();
        let stores_a = stores.get(city_a).to_vec();
        let stores_b = stores.get(city_b).to_vec();
        let mut categories_b: HashMap<StoreId, Vec<Category>> = HashMap::new();

        for &store_a in &stores_a {
            let categories_a = self.categories_at(store_a).await?;

            for category_a in &categories_a {
                let page_a = self.items_at(store_a, category_a).await?;
                if !self.category_large_enough(&page_a) {
                    continue;
                }
                info!(
                    store_id = %store_a,
                    slug = %category_a.slug,
                    total = page_a.total,
                    "candidate category"
                );
                pause(self.config.pacing.city_switch).await;

                for &store_b in &stores_b {
                    if !categories_b.contains_key(&store_b) {
                        let listed = self.categories_at(store_b).await?;
                        categories_b.insert(store_b, listed);
                    }
                    let Some(category_b) = categories_b
                        .get(&store_b)
                        .and_then(|listed| listed.iter().find(|c| c.slug == category_a.slug))
                        .cloned()
                    else {
                        continue;
                    };

                    let page_b = self.items_at(store_b, &category_b).await?;
                    if !self.category_large_enough(&page_b) {
                        continue;
                    }

                    let matched = self.try_match(&category_a.slug, &page_a, &page_b).await;
                    if let Some(products) = matched {
                        info!(store_a = %store_a, store_b = %store_b, "stores matched");
                        return Ok(products);
                    }
                }
            }
        }

        warn!(
            min_common = self.config.min_common_products,
            "no store pair shares a category with enough in-stock products"
        );
        Ok(Vec::new())
    }

    /// Match two listings; resolve brands if enough products are shared.
    async fn try_match(
        &self,
        slug: &str,
        page_a: &CatalogPage,
        page_b: &CatalogPage,
    ) -> Option<Vec<MatchedProduct>> {
        let matches = in_stock_matches(&page_a.items, &page_b.items);
        if !meets_minimum(matches.len(), self.config.min_common_products) {
            info!(slug, shared = matches.len(), "not enough shared products");
            return None;
        }

        info!(slug, shared = matches.len(), "found shared products");
        Some(self.brands.enrich(&self.api, &matches).await)
    }

    fn category_large_enough(&self, page: &CatalogPage) -> bool {
        page.total >= self.config.min_category_items
    }

    /// Categories of `store_id` at the configured level, in listing order.
    async fn categories_at(&mut self, store_id: StoreId) -> Result<Vec<Category>, MatchError> {
        self.switch_to(store_id).await?;
        let level = self.config.category_level;
        let categories = self.api.categories().await?;
        Ok(categories
            .into_iter()
            .filter(|c| c.level == level)
            .collect())
    }

    async fn items_at(
        &mut self,
        store_id: StoreId,
        category: &Category,
    ) -> Result<CatalogPage, MatchError> {
        self.switch_to(store_id).await?;
        Ok(self.api.catalog_items(category.id).await?)
    }

    async fn switch_to(&mut self, store_id: StoreId) -> Result<(), MatchError> {
        if self.selected == Some(store_id) {
            return Ok(());
        }
        self.api.select_store(store_id).await?;
        self.selected = Some(store_id);
        pause(self.config.pacing.store_switch).await;
        Ok(())
    }
}

fn pick_store(stores: &[StoreId], pick: StorePick) -> Option<StoreId> {
    match pick {
        StorePick::First => stores.first().copied(),
        StorePick::Random => stores.choose(&mut rand::rng()).copied(),
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
