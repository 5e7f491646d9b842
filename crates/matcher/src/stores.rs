//! Store discovery.

use crosscity_client::CatalogApi;
use crosscity_core::{Store, StoreId};
use tracing::{info, instrument};

use crate::error::MatchError;

/// Qualifying store IDs per target city, in the order the backend listed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityStores {
    cities: Vec<(String, Vec<StoreId>)>,
}

impl CityStores {
    /// Stores found in `city`; empty if the city is not a target.
    #[must_use]
    pub fn get(&self, city: &str) -> &[StoreId] {
        self.cities
            .iter()
            .find(|(name, _)| name == city)
            .map_or(&[], |(_, ids)| ids.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[StoreId])> {
        self.cities
            .iter()
            .map(|(name, ids)| (name.as_str(), ids.as_slice()))
    }

    /// First target city without any store.
    #[must_use]
    pub fn first_empty(&self) -> Option<&str> {
        self.iter()
            .find(|(_, ids)| ids.is_empty())
            .map(|(city, _)| city)
    }
}

/// Group stores by target city.
///
/// A store belongs to the first city whose name appears in its address. When
/// `market_type` is set, stores of other formats are skipped.
#[must_use]
pub fn group_by_city(stores: &[Store], cities: &[&str], market_type: Option<&str>) -> CityStores {
    let mut grouped: Vec<(String, Vec<StoreId>)> = cities
        .iter()
        .map(|city| ((*city).to_string(), Vec::new()))
        .collect();

    for store in stores {
        if market_type.is_some_and(|wanted| store.market_type != wanted) {
            continue;
        }
        if let Some((_, ids)) = grouped
            .iter_mut()
            .find(|(city, _)| store.is_in_city(city))
        {
            ids.push(store.id);
        }
    }

    CityStores { cities: grouped }
}

/// Fetch all stores and group the qualifying ones by target city.
///
/// # Errors
///
/// Returns `MatchError::NoStores` if a target city has no qualifying store,
/// or `MatchError::Api` if the store listing fails.
#[instrument(skip(api))]
pub async fn discover_stores<A: CatalogApi>(
    api: &A,
    cities: [&str; 2],
    market_type: Option<&str>,
) -> Result<CityStores, MatchError> {
    let stores = api.stores().await?;
    let grouped = group_by_city(&stores.items, &cities, market_type);

    for (city, ids) in grouped.iter() {
        info!(city, count = ids.len(), "qualifying stores");
    }

    if let Some(city) = grouped.first_empty() {
        return Err(MatchError::NoStores {
            city: city.to_string(),
        });
    }

    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeCatalog, store};

    const MOSCOW: &str = "Москва";
    const PITER: &str = "Санкт-Петербург";
    const CITIES: [&str; 2] = [MOSCOW, PITER];

    #[test]
    fn test_group_by_city_and_market_type() {
        let stores = vec![
            store(1, "Москва, ул. Тверская, 1", "HM"),
            store(2, "Москва, ул. Арбат, 2", "SM"),
            store(3, "Санкт-Петербург, Невский пр., 3", "HM"),
            store(4, "Казань, ул. Баумана, 4", "HM"),
        ];

        let grouped = group_by_city(&stores, &CITIES, Some("HM"));
        assert_eq!(grouped.get(MOSCOW), &[StoreId::new(1)]);
        assert_eq!(grouped.get(PITER), &[StoreId::new(3)]);
        assert!(grouped.get("Казань").is_empty());

        let any_format = group_by_city(&stores, &CITIES, None);
        assert_eq!(any_format.get(MOSCOW), &[StoreId::new(1), StoreId::new(2)]);
    }

    #[test]
    fn test_store_counts_once_for_first_matching_city() {
        let address = "Москва, Санкт-Петербургское ш., 9";
        let stores = vec![store(9, address, "HM")];
        let grouped = group_by_city(&stores, &CITIES, None);
        assert_eq!(grouped.get(MOSCOW), &[StoreId::new(9)]);
        assert!(grouped.get(PITER).is_empty());
    }

    #[tokio::test]
    async fn test_discover_fails_when_a_city_has_no_store() {
        let moscow = store(1, "Москва, ул. Тверская, 1", "HM");
        let fake = FakeCatalog::new().with_stores(vec![moscow]);

        let err = discover_stores(&fake, CITIES, Some("HM"))
            .await
            .expect_err("no store in second city");
        assert!(matches!(err, MatchError::NoStores { ref city } if city == PITER));
    }

    #[tokio::test]
    async fn test_discover_finds_both_cities() {
        let fake = FakeCatalog::new().with_stores(vec![
            store(1, "Москва, ул. Тверская, 1", "HM"),
            store(3, "Санкт-Петербург, Невский пр., 3", "HM"),
        ]);

        let grouped = discover_stores(&fake, CITIES, Some("HM"))
            .await
            .expect("stores");
        assert_eq!(grouped.first_empty(), None);
        assert_eq!(grouped.iter().count(), 2);
    }
}
