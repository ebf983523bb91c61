//! # Review Repository
//!
//! Reviews and the cached restaurant rating derived from them.
//!
//! ## Mutation + Recompute
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create / update / delete review                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │    ├── write the review row                                             │
//! │    ├── SELECT star FROM reviews WHERE restaurant_id = ?                 │
//! │    ├── Rating::mean_of(stars)   (round half-up at tenths)               │
//! │    │       └── no stars left → rating left untouched                    │
//! │    └── UPDATE restaurants SET rating = ?                                │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  The rating is recomputed from the full set every time (no running      │
//! │  sums), inside the same transaction as the write, so the last committed │
//! │  rating always matches the committed rows.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::begin_write;
use feast_core::pagination::PageRequest;
use feast_core::rating::StarDistribution;
use feast_core::{Rating, Review, ReviewDetail};

const REVIEW_COLUMNS: &str =
    "id, user_id, restaurant_id, order_id, star, comment, created_at, updated_at";

const DETAIL_SELECT: &str = r#"
    SELECT
        v.id,
        v.user_id,
        u.name AS user_name,
        v.restaurant_id,
        r.name AS restaurant_name,
        v.star,
        v.comment,
        v.created_at,
        v.updated_at
    FROM reviews v
    INNER JOIN users u ON u.id = v.user_id
    INNER JOIN restaurants r ON r.id = v.restaurant_id
"#;

// =============================================================================
// Inputs
// =============================================================================

/// A review to insert, already validated and authorized.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub user_id: i64,
    pub restaurant_id: i64,
    pub order_id: i64,
    pub star: i64,
    pub comment: Option<String>,
}

/// Fields to change on an existing review. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct ReviewPatch {
    pub star: Option<i64>,
    pub comment: Option<String>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for reviews.
#[derive(Debug, Clone)]
pub struct ReviewRepository {
    pool: SqlitePool,
}

impl ReviewRepository {
    /// Creates a new ReviewRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReviewRepository { pool }
    }

    /// Inserts a review and refreshes the restaurant rating.
    ///
    /// ## Errors
    /// - `UniqueViolation` if the user already reviewed the restaurant
    pub async fn create(&self, new: &NewReview) -> DbResult<Review> {
        let mut tx = begin_write(&self.pool).await?;
        let now = Utc::now();

        let review = sqlx::query_as::<_, Review>(&format!(
            r#"
            INSERT INTO reviews (
                user_id, restaurant_id, order_id, star, comment, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            RETURNING {}
            "#,
            REVIEW_COLUMNS
        ))
        .bind(new.user_id)
        .bind(new.restaurant_id)
        .bind(new.order_id)
        .bind(new.star)
        .bind(&new.comment)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        recompute_in(&mut tx, review.restaurant_id).await?;
        tx.commit().await?;

        debug!(review_id = review.id, restaurant_id = review.restaurant_id, "Review created");
        Ok(review)
    }

    /// Updates an owned review. The rating is recomputed only when the star
    /// actually changed.
    ///
    /// ## Errors
    /// - `NotFound` if the review doesn't exist or belongs to someone else
    pub async fn update(&self, user_id: i64, review_id: i64, patch: &ReviewPatch) -> DbResult<Review> {
        let mut tx = begin_write(&self.pool).await?;

        let existing = fetch_owned(&mut tx, user_id, review_id)
            .await?
            .ok_or_else(|| DbError::not_found("Review", review_id))?;

        let star = patch.star.unwrap_or(existing.star);
        let comment = patch.comment.clone().or(existing.comment);

        let review = sqlx::query_as::<_, Review>(&format!(
            r#"
            UPDATE reviews SET star = ?1, comment = ?2, updated_at = ?3
            WHERE id = ?4 AND user_id = ?5
            RETURNING {}
            "#,
            REVIEW_COLUMNS
        ))
        .bind(star)
        .bind(&comment)
        .bind(Utc::now())
        .bind(review_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if review.star != existing.star {
            recompute_in(&mut tx, review.restaurant_id).await?;
        }

        tx.commit().await?;

        debug!(review_id, star_changed = review.star != existing.star, "Review updated");
        Ok(review)
    }

    /// Deletes an owned review and refreshes the restaurant rating.
    ///
    /// ## Returns
    /// The deleted review.
    ///
    /// ## Errors
    /// - `NotFound` if the review doesn't exist or belongs to someone else
    pub async fn delete(&self, user_id: i64, review_id: i64) -> DbResult<Review> {
        let mut tx = begin_write(&self.pool).await?;

        let existing = fetch_owned(&mut tx, user_id, review_id)
            .await?
            .ok_or_else(|| DbError::not_found("Review", review_id))?;

        sqlx::query("DELETE FROM reviews WHERE id = ?1 AND user_id = ?2")
            .bind(review_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        recompute_in(&mut tx, existing.restaurant_id).await?;
        tx.commit().await?;

        debug!(review_id, restaurant_id = existing.restaurant_id, "Review deleted");
        Ok(existing)
    }

    /// Recomputes a restaurant's rating from all of its reviews.
    ///
    /// ## Returns
    /// The new rating, or `None` when the restaurant has no reviews (the
    /// stored rating is then left unchanged).
    pub async fn recompute_rating(&self, restaurant_id: i64) -> DbResult<Option<Rating>> {
        let mut conn = self.pool.acquire().await?;
        recompute_in(&mut conn, restaurant_id).await
    }

    /// Gets a review by id.
    #[cfg(test)]
    pub async fn get(&self, review_id: i64) -> DbResult<Option<Review>> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE id = ?1",
            REVIEW_COLUMNS
        ))
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    /// Whether the user already reviewed the restaurant.
    pub async fn exists_for(&self, user_id: i64, restaurant_id: i64) -> DbResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reviews WHERE user_id = ?1 AND restaurant_id = ?2)",
        )
        .bind(user_id)
        .bind(restaurant_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Reviews of a restaurant, newest first, optionally only one star value.
    ///
    /// ## Returns
    /// `(page_of_reviews, total_matching)`
    pub async fn list_for_restaurant(
        &self,
        restaurant_id: i64,
        star: Option<i64>,
        page: PageRequest,
    ) -> DbResult<(Vec<ReviewDetail>, i64)> {
        let reviews = sqlx::query_as::<_, ReviewDetail>(&format!(
            r#"
            {}
            WHERE v.restaurant_id = ?1 AND (?2 IS NULL OR v.star = ?2)
            ORDER BY v.created_at DESC, v.id DESC
            LIMIT ?3 OFFSET ?4
            "#,
            DETAIL_SELECT
        ))
        .bind(restaurant_id)
        .bind(star)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reviews WHERE restaurant_id = ?1 AND (?2 IS NULL OR star = ?2)",
        )
        .bind(restaurant_id)
        .bind(star)
        .fetch_one(&self.pool)
        .await?;

        Ok((reviews, total))
    }

    /// Reviews written by a user, newest first.
    pub async fn list_for_user(
        &self,
        user_id: i64,
        page: PageRequest,
    ) -> DbResult<(Vec<ReviewDetail>, i64)> {
        let reviews = sqlx::query_as::<_, ReviewDetail>(&format!(
            r#"
            {}
            WHERE v.user_id = ?1
            ORDER BY v.created_at DESC, v.id DESC
            LIMIT ?2 OFFSET ?3
            "#,
            DETAIL_SELECT
        ))
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE user_id = ?1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((reviews, total))
    }

    /// Histogram of a restaurant's stars over 1..=5.
    pub async fn distribution(&self, restaurant_id: i64) -> DbResult<StarDistribution> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT star, COUNT(*) FROM reviews WHERE restaurant_id = ?1 GROUP BY star",
        )
        .bind(restaurant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(StarDistribution::from_counts(rows))
    }
}

// =============================================================================
// Connection-level helpers
// =============================================================================

async fn fetch_owned(
    conn: &mut SqliteConnection,
    user_id: i64,
    review_id: i64,
) -> DbResult<Option<Review>> {
    let review = sqlx::query_as::<_, Review>(&format!(
        "SELECT {} FROM reviews WHERE id = ?1 AND user_id = ?2",
        REVIEW_COLUMNS
    ))
    .bind(review_id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(review)
}

/// Reads every star of the restaurant and stores the rounded mean.
async fn recompute_in(conn: &mut SqliteConnection, restaurant_id: i64) -> DbResult<Option<Rating>> {
    let stars: Vec<i64> = sqlx::query_scalar("SELECT star FROM reviews WHERE restaurant_id = ?1")
        .bind(restaurant_id)
        .fetch_all(&mut *conn)
        .await?;

    let Some(rating) = Rating::mean_of(&stars) else {
        debug!(restaurant_id, "No reviews left, rating unchanged");
        return Ok(None);
    };

    sqlx::query("UPDATE restaurants SET rating = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(rating)
        .bind(Utc::now())
        .bind(restaurant_id)
        .execute(&mut *conn)
        .await?;

    info!(restaurant_id, reviews = stars.len(), %rating, "Rating recomputed");
    Ok(Some(rating))
}

// =============================================================================
// Unit Tests
// =============================================================================
