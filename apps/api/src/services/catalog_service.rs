//! Restaurant discovery.
//!
//! Filtering happens in SQL; distance from the reference coordinate is
//! computed here, then results are sorted nearest-first (ties by id) and
//! paged.

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use feast_core::geo::{round_km, Coordinate};
use feast_core::pagination::{PageRequest, Paginated};
use feast_core::validation::{validate_min_rating, validate_optional_text, validate_search_query, MAX_NAME_LEN};
use feast_core::{Rating, Restaurant, RestaurantDetail, RestaurantListing};
use feast_db::RestaurantFilter;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Query string of `GET /restaurants`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestaurantQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_rating: Option<f64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

pub struct CatalogService {
    state: Arc<AppState>,
}

impl CatalogService {
    pub fn new(state: Arc<AppState>) -> Self {
        CatalogService { state }
    }

    /// Lists restaurants nearest-first.
    pub async fn list(&self, query: RestaurantQuery) -> ApiResult<Paginated<RestaurantListing>> {
        let page = PageRequest::new(query.page, query.limit)?;

        let min_rating = match query.min_rating {
            Some(value) => {
                validate_min_rating(value)?;
                Some(Rating::from_f64(value))
            }
            None => None,
        };

        let filter = RestaurantFilter {
            search: validate_search_query(query.search.as_deref())?,
            category: validate_optional_text("category", query.category.as_deref(), MAX_NAME_LEN)?,
            min_rating,
        };

        let restaurants = self.state.db.catalog().list_restaurants(&filter).await?;
        let listings = sort_by_distance(restaurants, &self.state.reference);
        let total = listings.len() as i64;

        let items = listings
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit()).unwrap_or(usize::MAX))
            .collect();

        debug!(total, page = page.page(), "Restaurants listed");
        Ok(Paginated::new(items, page, total))
    }

    /// A restaurant with its menus.
    pub async fn detail(&self, restaurant_id: i64) -> ApiResult<RestaurantDetail> {
        let catalog = self.state.db.catalog();

        let restaurant = catalog
            .get_restaurant(restaurant_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Restaurant not found: {}", restaurant_id)))?;

        let menus = catalog.menus_for(restaurant_id).await?;
        let distance_km = round_km(distance_to(&restaurant, &self.state.reference));

        Ok(RestaurantDetail {
            restaurant,
            distance_km,
            menus,
        })
    }
}

fn distance_to(restaurant: &Restaurant, reference: &Coordinate) -> f64 {
    reference.distance_km(&Coordinate::new(restaurant.latitude, restaurant.longitude))
}

fn sort_by_distance(restaurants: Vec<Restaurant>, reference: &Coordinate) -> Vec<RestaurantListing> {
    let mut measured: Vec<(f64, Restaurant)> = restaurants
        .into_iter()
        .map(|r| (distance_to(&r, reference), r))
        .collect();

    measured.sort_by(|(da, a), (db, b)| da.total_cmp(db).then(a.id.cmp(&b.id)));

    measured
        .into_iter()
        .map(|(distance, restaurant)| RestaurantListing {
            restaurant,
            distance_km: round_km(distance),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support;
    use feast_core::ErrorKind;

    #[tokio::test]
    async fn test_nearest_first_with_paging() {
        let state = test_support::state().await;
        // Reference point is (-6.2088, 106.8456)
        let far = test_support::restaurant(&state, "Far", -6.30, 106.90).await;
        let near = test_support::restaurant(&state, "Near", -6.2088, 106.8456).await;
        let mid = test_support::restaurant(&state, "Mid", -6.22, 106.85).await;

        let service = CatalogService::new(state);
        let page = service.list(RestaurantQuery::default()).await.unwrap();

        let ids: Vec<i64> = page.items.iter().map(|l| l.restaurant.id).collect();
        assert_eq!(ids, vec![near.id, mid.id, far.id]);
        assert_eq!(page.items[0].distance_km, 0.0);
        assert_eq!(page.total, 3);

        let second = service
            .list(RestaurantQuery {
                page: Some(2),
                limit: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].restaurant.id, far.id);
        assert_eq!(second.total_pages, 2);
    }

    #[tokio::test]
    async fn test_search_filter() {
        let state = test_support::state().await;
        test_support::restaurant(&state, "Sate Pak Kumis", -6.2, 106.8).await;
        test_support::restaurant(&state, "Bakso Malang", -6.2, 106.8).await;

        let page = CatalogService::new(state)
            .list(RestaurantQuery {
                search: Some("SATE".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].restaurant.name, "Sate Pak Kumis");
    }

    #[tokio::test]
    async fn test_invalid_query() {
        let state = test_support::state().await;
        let service = CatalogService::new(state);

        let err = service
            .list(RestaurantQuery {
                min_rating: Some(7.5),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorKind::ValidationFailed);

        let err = service
            .list(RestaurantQuery {
                limit: Some(0),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorKind::ValidationFailed);
    }

    #[tokio::test]
    async fn test_detail() {
        let state = test_support::state().await;
        let resto = test_support::restaurant(&state, "Warung", -6.2, 106.8).await;
        test_support::menu(&state, resto.id, "Nasi Goreng", 25000).await;

        let service = CatalogService::new(state);
        let detail = service.detail(resto.id).await.unwrap();
        assert_eq!(detail.menus.len(), 1);
        assert!(detail.distance_km > 0.0);

        let err = service.detail(resto.id + 100).await.unwrap_err();
        assert_eq!(err.code, ErrorKind::NotFound);
    }
}
