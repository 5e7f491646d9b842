//! The `stores` command.

use crosscity_client::{CatalogApi, CatalogClient};
use crosscity_matcher::stores::group_by_city;
use tracing::{info, warn};

use super::{CommandError, load_config};
use crate::CityArgs;

/// Log the stores each target city would search.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the store listing fails.
pub async fn list_stores(cities: &CityArgs) -> Result<(), CommandError> {
    let (client_config, config) = load_config(cities)?;
    let client = CatalogClient::new(client_config)?;

    let stores = client.stores().await?;
    let grouped = group_by_city(&stores.items, &config.cities(), config.market_type.as_deref());

    for (city, ids) in grouped.iter() {
        if ids.is_empty() {
            warn!(city, "no qualifying stores");
            continue;
        }
        for store in stores.items.iter().filter(|s| ids.contains(&s.id)) {
            info!(
                city,
                store_id = %store.id,
                market_type = %store.market_type,
                address = %store.address_full,
                "store"
            );
        }
    }
    Ok(())
}
