//! Review service implementation.
//!
//! ## Create Review
//! ```text
//! POST /reviews {order_code, restaurant_id, star, comment?}
//!      │
//!      ▼
//! validate star (1..=5) and comment (≤ 1000)
//!      │
//!      ▼
//! restaurant exists? ───────────────────────── no ──► NotFound
//!      │
//!      ▼
//! order owned by user AND has a line from it? ─ no ──► Forbidden
//!      │
//!      ▼
//! already reviewed? ─────────────────────────── yes ─► Conflict
//!      │
//!      ▼
//! reviews().create()  (insert + rating recompute, one transaction)
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use feast_core::pagination::{PageRequest, Paginated};
use feast_core::rating::StarDistribution;
use feast_core::validation::{validate_id, validate_optional_text, validate_star, MAX_COMMENT_LEN};
use feast_core::{Rating, Review, ReviewDetail};
use feast_db::{DbError, NewReview, ReviewPatch};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const ALREADY_REVIEWED: &str = "You have already reviewed this restaurant";

/// Body of `POST /reviews`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReviewRequest {
    pub order_code: String,
    pub restaurant_id: i64,
    pub star: i64,
    pub comment: Option<String>,
}

/// Body of `PATCH /reviews/{id}`. Omitted fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReviewRequest {
    pub star: Option<i64>,
    pub comment: Option<String>,
}

/// Query string of `GET /restaurants/{id}/reviews`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewQuery {
    pub star: Option<i64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Query string of `GET /reviews/me`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Reviews of one restaurant plus its star histogram.
#[derive(Debug, Clone, Serialize)]
pub struct RestaurantReviews {
    pub restaurant_id: i64,
    pub rating: Rating,
    pub distribution: StarDistribution,
    #[serde(flatten)]
    pub reviews: Paginated<ReviewDetail>,
}

pub struct ReviewService {
    state: Arc<AppState>,
}

impl ReviewService {
    pub fn new(state: Arc<AppState>) -> Self {
        ReviewService { state }
    }

    /// Reviews a restaurant the user ordered from.
    ///
    /// ## Errors
    /// - `ValidationFailed` for a star outside 1..=5 or an overlong comment
    /// - `NotFound` when the restaurant doesn't exist
    /// - `Forbidden` when the order isn't the user's or has nothing from
    ///   the restaurant
    /// - `Conflict` when the user already reviewed the restaurant
    pub async fn create(&self, user_id: i64, request: CreateReviewRequest) -> ApiResult<Review> {
        validate_star(request.star)?;
        validate_id("restaurant_id", request.restaurant_id)?;
        let comment = validate_optional_text("comment", request.comment.as_deref(), MAX_COMMENT_LEN)?;

        let db = &self.state.db;

        if db.catalog().get_restaurant(request.restaurant_id).await?.is_none() {
            return Err(ApiError::not_found(format!(
                "Restaurant not found: {}",
                request.restaurant_id
            )));
        }

        let order = match db.orders().find_by_code(user_id, request.order_code.trim()).await? {
            Some(order) => order,
            None => {
                warn!(user_id, "Review with an order the user doesn't own");
                return Err(ApiError::forbidden("Order does not belong to you"));
            }
        };

        if !db.orders().contains_restaurant(order.id, request.restaurant_id).await? {
            warn!(user_id, restaurant_id = request.restaurant_id, "Review without purchase");
            return Err(ApiError::forbidden("Order has no items from this restaurant"));
        }

        if db.reviews().exists_for(user_id, request.restaurant_id).await? {
            return Err(ApiError::conflict(ALREADY_REVIEWED));
        }

        let review = db
            .reviews()
            .create(&NewReview {
                user_id,
                restaurant_id: request.restaurant_id,
                order_id: order.id,
                star: request.star,
                comment,
            })
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent create
                DbError::UniqueViolation { .. } => ApiError::conflict(ALREADY_REVIEWED),
                other => other.into(),
            })?;

        info!(user_id, review_id = review.id, star = review.star, "Review created");
        Ok(review)
    }

    /// Changes the star and/or comment of an owned review.
    pub async fn update(
        &self,
        user_id: i64,
        review_id: i64,
        request: UpdateReviewRequest,
    ) -> ApiResult<Review> {
        if let Some(star) = request.star {
            validate_star(star)?;
        }
        let comment = validate_optional_text("comment", request.comment.as_deref(), MAX_COMMENT_LEN)?;

        let review = self
            .state
            .db
            .reviews()
            .update(
                user_id,
                review_id,
                &ReviewPatch {
                    star: request.star,
                    comment,
                },
            )
            .await?;

        Ok(review)
    }

    /// Deletes an owned review.
    pub async fn delete(&self, user_id: i64, review_id: i64) -> ApiResult<()> {
        let review = self.state.db.reviews().delete(user_id, review_id).await?;
        info!(user_id, review_id, restaurant_id = review.restaurant_id, "Review deleted");
        Ok(())
    }

    /// Reviews of a restaurant, newest first, with histogram.
    pub async fn for_restaurant(
        &self,
        restaurant_id: i64,
        query: ReviewQuery,
    ) -> ApiResult<RestaurantReviews> {
        let page = PageRequest::new(query.page, query.limit)?;
        if let Some(star) = query.star {
            validate_star(star)?;
        }

        let db = &self.state.db;

        let restaurant = db
            .catalog()
            .get_restaurant(restaurant_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Restaurant not found: {}", restaurant_id)))?;

        let (reviews, total) = db
            .reviews()
            .list_for_restaurant(restaurant_id, query.star, page)
            .await?;
        let distribution = db.reviews().distribution(restaurant_id).await?;

        Ok(RestaurantReviews {
            restaurant_id,
            rating: restaurant.rating,
            distribution,
            reviews: Paginated::new(reviews, page, total),
        })
    }

    /// Reviews written by the user.
    pub async fn mine(&self, user_id: i64, query: PageQuery) -> ApiResult<Paginated<ReviewDetail>> {
        let page = PageRequest::new(query.page, query.limit)?;
        let (reviews, total) = self.state.db.reviews().list_for_user(user_id, page).await?;
        Ok(Paginated::new(reviews, page, total))
    }
}
